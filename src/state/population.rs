//! Particle population storage.

use crate::error::{AnnealError, Result};

/// A single sample: a parameter vector plus its log-likelihoods.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Particle {
    /// Parameter vector θ (length `P`).
    pub theta: Vec<f64>,
    /// Log prior density.
    pub prior: f64,
    /// Data log-likelihood.
    pub data: f64,
    /// Log posterior at the current β.
    pub posterior: f64,
}

/// An ordered collection of `N` particles.
///
/// Parameters live in one contiguous row-major `N × P` buffer; the three
/// log-likelihoods are parallel vectors of length `N`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population {
    parameters: usize,
    theta: Vec<f64>,
    prior: Vec<f64>,
    data: Vec<f64>,
    posterior: Vec<f64>,
}

impl Population {
    /// Creates an empty population of `parameters`-dimensional particles.
    pub fn with_capacity(parameters: usize, samples: usize) -> Self {
        Self {
            parameters,
            theta: Vec::with_capacity(samples * parameters),
            prior: Vec::with_capacity(samples),
            data: Vec::with_capacity(samples),
            posterior: Vec::with_capacity(samples),
        }
    }

    /// Builds a population from raw buffers.
    ///
    /// `theta` is row-major with `parameters` columns; every likelihood
    /// vector must have one entry per row.
    pub fn from_parts(
        parameters: usize,
        theta: Vec<f64>,
        prior: Vec<f64>,
        data: Vec<f64>,
        posterior: Vec<f64>,
    ) -> Result<Self> {
        if parameters == 0 {
            return Err(AnnealError::config("particles need at least one parameter"));
        }
        let samples = data.len();
        if samples == 0 {
            return Err(AnnealError::EmptyPopulation);
        }
        check_len("theta", samples * parameters, theta.len())?;
        check_len("prior log-likelihoods", samples, prior.len())?;
        check_len("posterior log-likelihoods", samples, posterior.len())?;

        Ok(Self {
            parameters,
            theta,
            prior,
            data,
            posterior,
        })
    }

    /// Builds a population from individual particles.
    pub fn from_particles(particles: &[Particle]) -> Result<Self> {
        let first = particles.first().ok_or(AnnealError::EmptyPopulation)?;
        let mut population = Self::with_capacity(first.theta.len(), particles.len());
        for particle in particles {
            population.push(particle)?;
        }
        Ok(population)
    }

    /// Appends a particle.
    pub fn push(&mut self, particle: &Particle) -> Result<()> {
        check_len("particle parameters", self.parameters, particle.theta.len())?;
        self.theta.extend_from_slice(&particle.theta);
        self.prior.push(particle.prior);
        self.data.push(particle.data);
        self.posterior.push(particle.posterior);
        Ok(())
    }

    /// Copies particle `index` of `source` onto the end of `self`.
    pub(crate) fn push_from(&mut self, source: &Population, index: usize) {
        self.theta.extend_from_slice(source.theta_row(index));
        self.prior.push(source.prior[index]);
        self.data.push(source.data[index]);
        self.posterior.push(source.posterior[index]);
    }

    /// Number of particles `N`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of parameters `P`.
    pub fn parameters(&self) -> usize {
        self.parameters
    }

    /// Parameter vector of particle `index`.
    pub fn theta_row(&self, index: usize) -> &[f64] {
        let start = index * self.parameters;
        &self.theta[start..start + self.parameters]
    }

    /// Mutable parameter vector of particle `index`.
    pub fn theta_row_mut(&mut self, index: usize) -> &mut [f64] {
        let start = index * self.parameters;
        &mut self.theta[start..start + self.parameters]
    }

    /// The whole row-major `N × P` parameter buffer.
    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    pub fn prior(&self) -> &[f64] {
        &self.prior
    }

    pub fn prior_mut(&mut self) -> &mut [f64] {
        &mut self.prior
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn posterior(&self) -> &[f64] {
        &self.posterior
    }

    pub fn posterior_mut(&mut self) -> &mut [f64] {
        &mut self.posterior
    }

    /// Returns an owned copy of particle `index`.
    pub fn particle(&self, index: usize) -> Particle {
        Particle {
            theta: self.theta_row(index).to_vec(),
            prior: self.prior[index],
            data: self.data[index],
            posterior: self.posterior[index],
        }
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(AnnealError::DimensionMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

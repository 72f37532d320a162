//! Least-squares linear regression by batch gradient descent

use super::Model;
use crate::error::{Error, Result};
use crate::linalg::{backend, DenseMatrix, MatrixLike, MatrixLikeMut, NumericBackend, Vector};
use crate::table::{Column, DataFrame};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearRegressionConfig {
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Stop once no coefficient moves by this much in one step
    pub tolerance: f64,
    /// Append a constant feature; its coefficient is the last one
    pub fit_intercept: bool,
}

impl Default for LinearRegressionConfig {
    fn default() -> Self {
        LinearRegressionConfig {
            max_iter: 50,
            learning_rate: 0.01,
            tolerance: 1e-4,
            fit_intercept: true,
        }
    }
}

#[derive(Debug)]
pub struct LinearRegression {
    config: LinearRegressionConfig,
    backend: Arc<dyn NumericBackend>,
    theta: Option<Vector>,
    iterations: usize,
    converged: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        LinearRegression::new(LinearRegressionConfig::default())
    }
}

impl LinearRegression {
    pub fn new(config: LinearRegressionConfig) -> Self {
        LinearRegression {
            config,
            backend: backend::default_backend(),
            theta: None,
            iterations: 0,
            converged: false,
        }
    }

    /// Allocate through `backend` instead of the process default
    pub fn with_backend(mut self, backend: Arc<dyn NumericBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn config(&self) -> &LinearRegressionConfig {
        &self.config
    }

    /// Fitted coefficients, feature order first, intercept last
    pub fn coefficients(&self) -> Option<&Vector> {
        self.theta.as_ref()
    }

    pub fn intercept(&self) -> Option<f64> {
        if !self.config.fit_intercept {
            return None;
        }
        let theta = self.theta.as_ref()?;
        theta.as_slice()?.last().copied()
    }

    /// Gradient steps taken by the last `fit`
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    fn design_matrix(&self, features: &DataFrame) -> Result<DenseMatrix> {
        let x = features.to_matrix()?;
        if !self.config.fit_intercept {
            return Ok(x);
        }
        let ones = DenseMatrix::from_fn(x.rows(), 1, |_, _| 1.0);
        x.cbind(&ones)
    }
}

fn has_absent(values: &[f64]) -> bool {
    values.iter().any(|v| v.is_nan())
}

impl Model for LinearRegression {
    fn fit(&mut self, features: &DataFrame, target: &Column) -> Result<()> {
        let x = self.design_matrix(features)?;
        let y = target.to_vector()?;
        if y.rows() != x.rows() {
            return Err(Error::dimension_mismatch("fit", x.dim(), y.dim()));
        }
        if x.rows() == 0 {
            return Err(Error::unsupported("fit on an empty frame"));
        }
        if x.as_slice().is_some_and(has_absent) || y.as_slice().is_some_and(has_absent) {
            return Err(Error::unsupported("fit with absent values"));
        }

        let cfg = self.config;
        let step = cfg.learning_rate / x.rows() as f64;
        let xt = x.t_view();
        let mut theta = self.backend.zeros(x.cols());
        self.theta = None;
        self.iterations = 0;
        self.converged = false;

        log::debug!(
            "fitting linear regression: {} samples, {} coefficients",
            x.rows(),
            x.cols()
        );

        for iter in 1..=cfg.max_iter {
            let residual = x.times(&theta)?.minus(&y)?;
            let gradient = xt.times(&residual)?;
            let mut next = theta.clone();
            next.minus_assign(&gradient.times_scalar(step))?;
            let settled = next.almost_the_same(&theta, cfg.tolerance);
            if log::log_enabled!(log::Level::Trace) {
                log::trace!("iteration {iter}: loss {}", residual.mul(&residual)?.sum() / 2.0);
            }
            theta = next;
            self.iterations = iter;
            if settled {
                self.converged = true;
                break;
            }
        }

        if self.converged {
            log::debug!("converged after {} iterations", self.iterations);
        } else {
            log::warn!(
                "gradient descent stopped at max_iter={} before reaching tolerance {}",
                cfg.max_iter,
                cfg.tolerance
            );
        }
        self.theta = Some(theta);
        Ok(())
    }

    fn predict(&self, features: &DataFrame) -> Result<Column> {
        let theta = self
            .theta
            .as_ref()
            .ok_or_else(|| Error::unsupported("predict before fit"))?;
        let x = self.design_matrix(features)?;
        let y = x.times(theta)?;
        Ok(Column::new("prediction", y.into_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{DenseBackend, VectorLike};
    use crate::table::{dataframe_of, DataType, Value};
    use crate::values;
    use approx::assert_abs_diff_eq;

    fn line() -> (DataFrame, Column) {
        let xs = [0.0, 0.25, 0.5, 0.75, 1.0];
        let features = DataFrame::from(Column::new("x", xs.to_vec()));
        let target = Column::new("y", xs.iter().map(|x| 1.0 + 2.0 * x).collect::<Vec<_>>());
        (features, target)
    }

    fn tight() -> LinearRegressionConfig {
        LinearRegressionConfig {
            max_iter: 5000,
            learning_rate: 0.5,
            tolerance: 1e-10,
            fit_intercept: true,
        }
    }

    #[test]
    fn test_recovers_line() {
        let (x, y) = line();
        let mut model = LinearRegression::new(tight());
        model.fit(&x, &y).unwrap();
        assert!(model.converged());
        let theta = model.coefficients().unwrap();
        assert_eq!(theta.size(), 2);
        assert_abs_diff_eq!(theta.at(0), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(model.intercept().unwrap(), 1.0, epsilon = 1e-6);

        let pred = model.predict(&x).unwrap();
        assert_eq!(pred.name(), "prediction");
        assert_eq!(pred.dtype(), DataType::FLOAT64);
        let last = pred.get(4).unwrap().as_f64().unwrap();
        assert_abs_diff_eq!(last, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_default_config_stops_at_max_iter() {
        let (x, y) = line();
        let mut model = LinearRegression::default().with_backend(Arc::new(DenseBackend));
        model.fit(&x, &y).unwrap();
        assert!(!model.converged());
        assert_eq!(model.iterations(), 50);
        assert!(model.coefficients().is_some());
    }

    #[test]
    fn test_without_intercept() {
        let (x, _) = line();
        let y = Column::new("y", vec![0.0, 0.75, 1.5, 2.25, 3.0]);
        let mut model = LinearRegression::new(LinearRegressionConfig {
            fit_intercept: false,
            ..tight()
        });
        model.fit(&x, &y).unwrap();
        assert_eq!(model.intercept(), None);
        assert_abs_diff_eq!(model.coefficients().unwrap().at(0), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_bad_input() {
        let (x, _) = line();
        let mut model = LinearRegression::default();
        assert!(model.predict(&x).is_err());

        let short = Column::new("y", vec![1.0, 2.0]);
        assert!(matches!(model.fit(&x, &short), Err(Error::DimensionMismatch { .. })));

        let names = Column::new("y", vec!["a".to_string(); 5]);
        assert!(matches!(model.fit(&x, &names), Err(Error::TypeMismatch { .. })));

        let gappy = dataframe_of(&["x"])
            .build(values![1.0, Value::Null, 2.0, 3.0, 4.0])
            .unwrap();
        let y = Column::new("y", vec![1.0; 5]);
        assert!(matches!(model.fit(&gappy, &y), Err(Error::UnsupportedOperation(_))));
    }
}

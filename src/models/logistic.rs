//! Logistic Regression for attrition classification
//!
//! Binary logistic regression with an L2 penalty and optional class-balanced
//! sample weights. Attrition is the rare class, so the balanced weighting
//! raises the cost of each missed leaver to the level of the majority class.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for logistic regression
#[derive(Error, Debug)]
pub enum LogisticRegressionError {
    #[error("Model has not been fitted yet")]
    NotFitted,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Training labels hold a single class")]
    SingleClass,

    #[error("Hessian is not positive definite")]
    SingularHessian,

    #[error("Objective became non-finite at iteration {0}")]
    NonFinite(usize),

    #[error("Convergence failed after {0} iterations")]
    ConvergenceFailed(usize),
}

/// Per-class weighting of the training loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample weighs 1
    None,
    /// Class `c` weighs `n_samples / (2 * n_c)`
    #[default]
    Balanced,
}

/// Optimizer used to fit the coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solver {
    /// Damped Newton iterations with backtracking line search
    Newton,
    /// Mini-batch gradient descent over seeded shuffles
    Sgd {
        epochs: usize,
        batch_size: usize,
        learning_rate: f64,
    },
}

impl Default for Solver {
    fn default() -> Self {
        Solver::Newton
    }
}

/// Step decay applied per epoch by the SGD solver
const SGD_DECAY: f64 = 0.01;
/// Armijo sufficient-decrease constant
const ARMIJO: f64 = 1e-4;
/// Maximum step halvings per Newton iteration
const MAX_BACKTRACK: usize = 50;

/// Logistic Regression classifier
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Intercept term
    pub intercept: Option<f64>,
    /// Inverse regularization strength
    c: f64,
    /// Maximum Newton iterations
    max_iter: usize,
    /// Convergence tolerance
    tolerance: f64,
    /// Whether to fit intercept
    fit_intercept: bool,
    /// Class weighting of the loss
    class_weight: ClassWeight,
    /// Optimizer
    solver: Solver,
    /// Seed of the solver's random source
    random_state: u64,
    /// Objective value after each iteration (or epoch)
    pub cost_history: Vec<f64>,
    /// Iterations used by the last fit
    pub n_iter: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(1.0, 100, 1e-6, true)
    }
}

impl LogisticRegression {
    /// Create a new Logistic Regression model with balanced class weights
    pub fn new(c: f64, max_iter: usize, tolerance: f64, fit_intercept: bool) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            c,
            max_iter,
            tolerance,
            fit_intercept,
            class_weight: ClassWeight::Balanced,
            solver: Solver::Newton,
            random_state: 42,
            cost_history: Vec::new(),
            n_iter: 0,
        }
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Sigmoid activation function
    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let exp_z = z.exp();
            exp_z / (1.0 + exp_z)
        }
    }

    /// `ln(1 + e^z)` without overflow
    fn softplus(z: f64) -> f64 {
        if z > 0.0 {
            z + (-z).exp().ln_1p()
        } else {
            z.exp().ln_1p()
        }
    }

    /// Per-sample loss weights
    pub fn sample_weights(&self, y: &Array1<f64>) -> Array1<f64> {
        match self.class_weight {
            ClassWeight::None => Array1::ones(y.len()),
            ClassWeight::Balanced => {
                let n = y.len() as f64;
                let n_pos = y.iter().filter(|&&v| v >= 0.5).count() as f64;
                let n_neg = n - n_pos;
                let w_pos = n / (2.0 * n_pos);
                let w_neg = n / (2.0 * n_neg);
                y.mapv(|v| if v >= 0.5 { w_pos } else { w_neg })
            }
        }
    }

    /// Design matrix with a leading column of ones when fitting an intercept
    fn design(&self, x: &Array2<f64>) -> Array2<f64> {
        if self.fit_intercept {
            let mut design = Array2::ones((x.nrows(), x.ncols() + 1));
            design.slice_mut(ndarray::s![.., 1..]).assign(x);
            design
        } else {
            x.clone()
        }
    }

    /// Penalty per parameter; the intercept is not penalized
    fn penalty_mask(&self, n_params: usize, lambda: f64) -> Array1<f64> {
        let mut pen = Array1::from_elem(n_params, lambda);
        if self.fit_intercept {
            pen[0] = 0.0;
        }
        pen
    }

    /// Weighted mean log loss plus L2 penalty
    fn objective(
        design: &Array2<f64>,
        y: &Array1<f64>,
        weights: &Array1<f64>,
        pen: &Array1<f64>,
        theta: &Array1<f64>,
        weight_sum: f64,
    ) -> f64 {
        let z = design.dot(theta);
        let loss: f64 = z
            .iter()
            .zip(y.iter())
            .zip(weights.iter())
            .map(|((&zi, &yi), &si)| si * (Self::softplus(zi) - yi * zi))
            .sum::<f64>()
            / weight_sum;
        let penalty: f64 = 0.5
            * pen
                .iter()
                .zip(theta.iter())
                .map(|(&p, &t)| p * t * t)
                .sum::<f64>();
        loss + penalty
    }

    /// Fit the model on a feature matrix and 0/1 labels
    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<(), LogisticRegressionError> {
        if x.nrows() != y.len() {
            return Err(LogisticRegressionError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        if !(self.c > 0.0) {
            return Err(LogisticRegressionError::InvalidParameter(format!(
                "C must be positive, got {}",
                self.c
            )));
        }

        let n_pos = y.iter().filter(|&&v| v >= 0.5).count();
        if n_pos == 0 || n_pos == y.len() {
            return Err(LogisticRegressionError::SingleClass);
        }

        log::debug!(
            "Fitting logistic regression on {} samples ({} positive), {} features",
            y.len(),
            n_pos,
            x.ncols()
        );

        let design = self.design(x);
        let weights = self.sample_weights(y);
        let weight_sum = weights.sum();
        let lambda = 1.0 / (self.c * weight_sum);
        let pen = self.penalty_mask(design.ncols(), lambda);

        self.cost_history.clear();
        self.n_iter = 0;

        let theta = match self.solver {
            Solver::Newton => self.fit_newton(&design, y, &weights, &pen, weight_sum)?,
            Solver::Sgd {
                epochs,
                batch_size,
                learning_rate,
            } => self.fit_sgd(
                &design,
                y,
                &weights,
                &pen,
                weight_sum,
                epochs,
                batch_size,
                learning_rate,
            )?,
        };

        if self.fit_intercept {
            self.intercept = Some(theta[0]);
            self.coefficients = Some(theta.slice(ndarray::s![1..]).to_owned());
        } else {
            self.intercept = Some(0.0);
            self.coefficients = Some(theta);
        }

        Ok(())
    }

    fn fit_newton(
        &mut self,
        design: &Array2<f64>,
        y: &Array1<f64>,
        weights: &Array1<f64>,
        pen: &Array1<f64>,
        weight_sum: f64,
    ) -> Result<Array1<f64>, LogisticRegressionError> {
        let n_params = design.ncols();
        let mut theta = Array1::<f64>::zeros(n_params);
        let mut cost = Self::objective(design, y, weights, pen, &theta, weight_sum);

        for iter in 0..=self.max_iter {
            let prob = design.dot(&theta).mapv(Self::sigmoid);
            let residual = (&prob - y) * weights / weight_sum;
            let grad = design.t().dot(&residual) + pen * &theta;

            let grad_max = grad.iter().fold(0.0_f64, |m, g| m.max(g.abs()));
            if !grad_max.is_finite() || !cost.is_finite() {
                return Err(LogisticRegressionError::NonFinite(iter));
            }
            if grad_max < self.tolerance {
                self.n_iter = iter;
                log::debug!("Newton solver converged at iteration {} (cost {:.6})", iter, cost);
                return Ok(theta);
            }
            if iter == self.max_iter {
                break;
            }

            // Hessian: X' diag(s * p * (1 - p)) X / S + diag(pen)
            let curvature = prob.mapv(|p| p * (1.0 - p)) * weights / weight_sum;
            let weighted = design * &curvature.view().insert_axis(Axis(1));
            let mut hessian = design.t().dot(&weighted);
            for j in 0..n_params {
                hessian[[j, j]] += pen[j] + 1e-10;
            }

            let step = cholesky_solve(&hessian, &grad)?;
            let slope = grad.dot(&step);

            let mut t = 1.0;
            let mut accepted = false;
            for _ in 0..MAX_BACKTRACK {
                let candidate = &theta - &(&step * t);
                let candidate_cost =
                    Self::objective(design, y, weights, pen, &candidate, weight_sum);
                let slack = 1e-14 * cost.abs().max(1.0);
                if candidate_cost.is_finite()
                    && candidate_cost <= cost - ARMIJO * t * slope + slack
                {
                    theta = candidate;
                    cost = candidate_cost;
                    accepted = true;
                    break;
                }
                t *= 0.5;
            }
            if !accepted {
                log::debug!("Line search stalled at iteration {} (max |grad| {:.3e})", iter, grad_max);
                return Err(LogisticRegressionError::ConvergenceFailed(iter));
            }

            self.cost_history.push(cost);
            log::debug!("Newton iteration {}: cost {:.8}, step {}", iter, cost, t);
        }

        Err(LogisticRegressionError::ConvergenceFailed(self.max_iter))
    }

    #[allow(clippy::too_many_arguments)]
    fn fit_sgd(
        &mut self,
        design: &Array2<f64>,
        y: &Array1<f64>,
        weights: &Array1<f64>,
        pen: &Array1<f64>,
        weight_sum: f64,
        epochs: usize,
        batch_size: usize,
        learning_rate: f64,
    ) -> Result<Array1<f64>, LogisticRegressionError> {
        if batch_size == 0 || !(learning_rate > 0.0) {
            return Err(LogisticRegressionError::InvalidParameter(format!(
                "SGD needs batch_size > 0 and learning_rate > 0, got {} and {}",
                batch_size, learning_rate
            )));
        }

        let n_samples = design.nrows();
        let n_params = design.ncols();
        // The batch gradient estimates the full averaged gradient
        let scale = n_samples as f64 / weight_sum;

        let mut theta = Array1::<f64>::zeros(n_params);
        let mut prev_cost = Self::objective(design, y, weights, pen, &theta, weight_sum);

        let mut rng = StdRng::seed_from_u64(self.random_state);
        let mut indices: Vec<usize> = (0..n_samples).collect();

        for epoch in 0..epochs {
            indices.shuffle(&mut rng);
            let lr = learning_rate / (1.0 + SGD_DECAY * epoch as f64);

            for batch in indices.chunks(batch_size) {
                let mut grad = pen * &theta;
                let batch_len = batch.len() as f64;
                for &i in batch {
                    let row = design.row(i);
                    let p = Self::sigmoid(row.dot(&theta));
                    let factor = weights[i] * (p - y[i]) * scale / batch_len;
                    grad.scaled_add(factor, &row);
                }
                theta.scaled_add(-lr, &grad);
            }

            let cost = Self::objective(design, y, weights, pen, &theta, weight_sum);
            if !cost.is_finite() {
                return Err(LogisticRegressionError::NonFinite(epoch));
            }
            self.cost_history.push(cost);

            if (prev_cost - cost).abs() < self.tolerance {
                self.n_iter = epoch + 1;
                log::debug!("SGD solver converged at epoch {} (cost {:.6})", epoch, cost);
                return Ok(theta);
            }
            prev_cost = cost;
        }

        Err(LogisticRegressionError::ConvergenceFailed(epochs))
    }

    fn fitted(&self) -> Result<(&Array1<f64>, f64), LogisticRegressionError> {
        let weights = self
            .coefficients
            .as_ref()
            .ok_or(LogisticRegressionError::NotFitted)?;
        let bias = self.intercept.ok_or(LogisticRegressionError::NotFitted)?;
        Ok((weights, bias))
    }

    /// Get decision function values (log-odds)
    pub fn decision_function(
        &self,
        x: &Array2<f64>,
    ) -> Result<Array1<f64>, LogisticRegressionError> {
        let (weights, bias) = self.fitted()?;
        if x.ncols() != weights.len() {
            return Err(LogisticRegressionError::DimensionMismatch {
                expected: weights.len(),
                got: x.ncols(),
            });
        }
        Ok(x.dot(weights) + bias)
    }

    /// Predict probabilities of the positive class
    pub fn predict_proba(
        &self,
        x: &Array2<f64>,
    ) -> Result<Array1<f64>, LogisticRegressionError> {
        Ok(self.decision_function(x)?.mapv(Self::sigmoid))
    }

    /// Predict class labels (0 or 1)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, LogisticRegressionError> {
        self.predict_with_threshold(x, 0.5)
    }

    /// Predict with custom threshold
    pub fn predict_with_threshold(
        &self,
        x: &Array2<f64>,
        threshold: f64,
    ) -> Result<Array1<f64>, LogisticRegressionError> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= threshold { 1.0 } else { 0.0 }))
    }

    /// Get model summary
    pub fn summary(&self, feature_names: Option<&[String]>) -> String {
        let mut s = String::new();
        s.push_str("Logistic Regression Summary\n");
        s.push_str("===========================\n\n");

        if let Some(ref coef) = self.coefficients {
            s.push_str(&format!(
                "Intercept: {:.6}\n\n",
                self.intercept.unwrap_or(0.0)
            ));
            s.push_str("Coefficients (log-odds):\n");

            for (i, &c) in coef.iter().enumerate() {
                let name = feature_names
                    .and_then(|names| names.get(i))
                    .map(String::as_str)
                    .unwrap_or("?");
                s.push_str(&format!(
                    "  {:3}. {:28}: {:>10.6} (OR: {:.4})\n",
                    i + 1,
                    name,
                    c,
                    c.exp()
                ));
            }

            s.push_str(&format!(
                "\nIterations: {}, final cost: {:.6}\n",
                self.n_iter,
                self.cost_history.last().unwrap_or(&0.0)
            ));
        } else {
            s.push_str("Model not fitted yet.\n");
        }

        s
    }
}

/// Solve `A x = b` for symmetric positive definite `A` via Cholesky
fn cholesky_solve(
    a: &Array2<f64>,
    b: &Array1<f64>,
) -> Result<Array1<f64>, LogisticRegressionError> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    // Cholesky decomposition: A = L * L^T
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return Err(LogisticRegressionError::SingularHessian);
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Solve L * z = b (forward substitution)
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // Solve L^T * x = z (backward substitution)
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Ok(x)
}

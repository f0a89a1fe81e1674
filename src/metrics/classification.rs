//! Classification metrics for the attrition classifier
//!
//! The pipeline scores its own training set, so these are in-sample
//! diagnostics. They are logged, never persisted.

use ndarray::Array1;

/// Confusion matrix for binary classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    /// True positives
    pub tp: usize,
    /// True negatives
    pub tn: usize,
    /// False positives
    pub fp: usize,
    /// False negatives
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Calculate confusion matrix from predictions
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut tp = 0;
        let mut tn = 0;
        let mut fp = 0;
        let mut fn_ = 0;

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t >= 0.5, p >= 0.5) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
            }
        }

        Self { tp, tn, fp, fn_ }
    }

    /// Total samples
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Print formatted confusion matrix
    pub fn display(&self) -> String {
        format!(
            "Confusion Matrix:\n\
             \n\
             Predicted:    Stay    Leave\n\
             Actual Stay:  {:>5}   {:>5}  (TN/FP)\n\
             Actual Leave: {:>5}   {:>5}  (FN/TP)\n",
            self.tn, self.fp, self.fn_, self.tp
        )
    }
}

/// Collection of classification metrics
#[derive(Debug, Clone)]
pub struct ClassificationMetrics {
    /// Confusion matrix
    pub confusion_matrix: ConfusionMatrix,
    /// Accuracy
    pub accuracy: f64,
    /// Precision
    pub precision: f64,
    /// Recall (sensitivity)
    pub recall: f64,
    /// F1 score
    pub f1: f64,
    /// Specificity
    pub specificity: f64,
    /// AUC-ROC
    pub auc_roc: f64,
    /// Log loss
    pub log_loss: f64,
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

impl ClassificationMetrics {
    /// Calculate metrics from labels and predicted probabilities.
    ///
    /// Hard predictions use a 0.5 cut-off.
    pub fn calculate(y_true: &Array1<f64>, y_proba: &Array1<f64>) -> Self {
        let y_pred = y_proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 });
        let cm = ConfusionMatrix::from_predictions(y_true, &y_pred);

        let precision = ratio(cm.tp, cm.tp + cm.fp);
        let recall = ratio(cm.tp, cm.tp + cm.fn_);
        let f1 = if precision + recall < 1e-10 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy: ratio(cm.tp + cm.tn, cm.total()),
            precision,
            recall,
            f1,
            specificity: ratio(cm.tn, cm.tn + cm.fp),
            auc_roc: Self::auc_roc(y_true, y_proba),
            log_loss: Self::log_loss(y_true, y_proba),
            confusion_matrix: cm,
        }
    }

    /// AUC-ROC (Area Under ROC Curve), trapezoid rule over tied scores
    fn auc_roc(y_true: &Array1<f64>, y_proba: &Array1<f64>) -> f64 {
        let n = y_true.len();

        let mut pairs: Vec<(f64, bool)> = y_proba
            .iter()
            .zip(y_true.iter())
            .map(|(&p, &t)| (p, t >= 0.5))
            .collect();

        // Sort by prediction descending
        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

        let n_pos = pairs.iter().filter(|(_, t)| *t).count() as f64;
        let n_neg = n as f64 - n_pos;

        if n_pos < 1.0 || n_neg < 1.0 {
            return 0.5;
        }

        let mut tpr_prev = 0.0;
        let mut fpr_prev = 0.0;
        let mut auc = 0.0;
        let mut tp = 0.0;
        let mut fp = 0.0;

        let mut i = 0;
        while i < n {
            let score = pairs[i].0;
            let mut j = i;
            while j < n && (pairs[j].0 - score).abs() < 1e-10 {
                if pairs[j].1 {
                    tp += 1.0;
                } else {
                    fp += 1.0;
                }
                j += 1;
            }

            let tpr = tp / n_pos;
            let fpr = fp / n_neg;
            auc += (fpr - fpr_prev) * (tpr + tpr_prev) / 2.0;

            tpr_prev = tpr;
            fpr_prev = fpr;
            i = j;
        }

        auc
    }

    /// Log Loss (Binary Cross-Entropy)
    fn log_loss(y_true: &Array1<f64>, y_proba: &Array1<f64>) -> f64 {
        let eps = 1e-15;
        let n = y_true.len().max(1) as f64;

        -y_true
            .iter()
            .zip(y_proba.iter())
            .map(|(&t, &p)| {
                let p_clipped = p.clamp(eps, 1.0 - eps);
                t * p_clipped.ln() + (1.0 - t) * (1.0 - p_clipped).ln()
            })
            .sum::<f64>()
            / n
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        let mut s = String::new();
        s.push_str("Training Set Diagnostics\n");
        s.push_str("========================\n\n");
        s.push_str(&self.confusion_matrix.display());
        s.push_str("\nMetrics:\n");
        s.push_str(&format!("  Accuracy:    {:.4}\n", self.accuracy));
        s.push_str(&format!("  Precision:   {:.4}\n", self.precision));
        s.push_str(&format!("  Recall:      {:.4}\n", self.recall));
        s.push_str(&format!("  F1 Score:    {:.4}\n", self.f1));
        s.push_str(&format!("  Specificity: {:.4}\n", self.specificity));
        s.push_str(&format!("  AUC-ROC:     {:.4}\n", self.auc_roc));
        s.push_str(&format!("  Log Loss:    {:.4}\n", self.log_loss));
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix() {
        let y_true = Array1::from_vec(vec![1.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
        let y_pred = Array1::from_vec(vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0]);

        let cm = ConfusionMatrix::from_predictions(&y_true, &y_pred);

        assert_eq!(cm.tp, 2);
        assert_eq!(cm.tn, 2);
        assert_eq!(cm.fp, 1);
        assert_eq!(cm.fn_, 1);
        assert_eq!(cm.total(), 6);
    }

    #[test]
    fn test_precision_recall_f1() {
        let y_true = Array1::from_vec(vec![1.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
        let y_proba = Array1::from_vec(vec![0.9, 0.1, 0.4, 0.7, 0.6, 0.2]);

        let metrics = ClassificationMetrics::calculate(&y_true, &y_proba);

        assert!((metrics.precision - 2.0 / 3.0).abs() < 1e-10);
        assert!((metrics.recall - 2.0 / 3.0).abs() < 1e-10);
        assert!((metrics.f1 - 2.0 / 3.0).abs() < 1e-10);
        assert!((metrics.accuracy - 4.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_auc_perfect() {
        let y_true = Array1::from_vec(vec![0.0, 0.0, 1.0, 1.0]);
        let y_proba = Array1::from_vec(vec![0.1, 0.2, 0.8, 0.9]);

        let metrics = ClassificationMetrics::calculate(&y_true, &y_proba);
        assert!((metrics.auc_roc - 1.0).abs() < 1e-10);
        assert!((metrics.recall - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_auc_single_class_is_neutral() {
        let y_true = Array1::from_vec(vec![0.0, 0.0]);
        let y_proba = Array1::from_vec(vec![0.3, 0.4]);

        let metrics = ClassificationMetrics::calculate(&y_true, &y_proba);
        assert_eq!(metrics.auc_roc, 0.5);
        assert_eq!(metrics.recall, 0.0);
    }
}

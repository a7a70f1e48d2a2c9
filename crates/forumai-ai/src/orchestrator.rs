//! Single and batch classification over a loaded model.
//!
//! normalize → encode → predict_proba → argmax. The orchestrator holds no
//! mutable state; concurrent calls share the model and stopwords read-only.

use std::sync::Arc;

use forumai_core::{BatchItem, PredictionResult};
use tracing::debug;

use crate::error::{ClassifyError, InferenceError};
use crate::model::{Model, ModelState};
use crate::normalize::normalize;
use crate::stopwords::StopwordSet;

/// Tolerance on the sum of a probability distribution.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

pub struct Orchestrator {
    state: ModelState,
    stopwords: Arc<StopwordSet>,
}

/// Outcome of running the pipeline on one text.
struct Inference {
    label: String,
    confidence: f64,
    probabilities: Vec<f64>,
}

impl Orchestrator {
    pub fn new(state: ModelState, stopwords: Arc<StopwordSet>) -> Self {
        Self { state, stopwords }
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    /// Classify one text and return the full probability map.
    ///
    /// Fails with `ModelUnavailable` before looking at the input, and with
    /// `InvalidInput` for empty text.
    pub fn classify_one(&self, text: &str) -> Result<PredictionResult, ClassifyError> {
        let model = self.ready_model()?;
        if text.is_empty() {
            return Err(ClassifyError::InvalidInput("Text is required".into()));
        }

        let inference = self.infer(model, text)?;
        Ok(PredictionResult {
            probabilities: model.labels().zip_probabilities(&inference.probabilities),
            label: inference.label,
            confidence: inference.confidence,
        })
    }

    /// Classify each text in order.
    ///
    /// Empty items are classified like any text that normalizes to nothing.
    /// Atomic: the first failing item aborts the whole batch and no partial
    /// results are returned.
    pub fn classify_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<BatchItem>, ClassifyError> {
        let model = self.ready_model()?;
        if texts.is_empty() {
            return Err(ClassifyError::InvalidInput("texts array is required".into()));
        }

        texts
            .iter()
            .map(|text| {
                let text = text.as_ref();
                let inference = self.infer(model, text)?;
                Ok(BatchItem {
                    text: text.to_string(),
                    label: inference.label,
                    confidence: inference.confidence,
                })
            })
            .collect()
    }

    fn ready_model(&self) -> Result<&Model, ClassifyError> {
        match &self.state {
            ModelState::Ready(model) => Ok(model.as_ref()),
            ModelState::Failed { cause } => Err(ClassifyError::ModelUnavailable(cause.clone())),
        }
    }

    fn infer(&self, model: &Model, text: &str) -> Result<Inference, InferenceError> {
        let normalized = normalize(text, &self.stopwords);
        let features = model.encoder().encode(&normalized)?;
        let probabilities = model.classifier().predict_proba(&features)?;
        check_distribution(&probabilities, model.labels().len())?;

        let (best, confidence) = argmax(&probabilities);
        let label = model
            .labels()
            .get(best)
            .ok_or_else(|| {
                InferenceError::MalformedDistribution(format!("no label at index {best}"))
            })?
            .to_string();

        debug!(
            normalized = %normalized,
            nnz = features.nnz(),
            label = %label,
            confidence,
            "classified text"
        );
        Ok(Inference {
            label,
            confidence,
            probabilities,
        })
    }
}

/// One finite value in `[0, 1]` per label, summing to 1.
fn check_distribution(p: &[f64], n_labels: usize) -> Result<(), InferenceError> {
    if p.len() != n_labels {
        return Err(InferenceError::MalformedDistribution(format!(
            "{} probabilities for {n_labels} labels",
            p.len()
        )));
    }
    if let Some(bad) = p
        .iter()
        .find(|v| !v.is_finite() || **v < 0.0 || **v > 1.0)
    {
        return Err(InferenceError::MalformedDistribution(format!(
            "probability {bad} outside [0, 1]"
        )));
    }
    let total: f64 = p.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(InferenceError::MalformedDistribution(format!(
            "probabilities sum to {total}"
        )));
    }
    Ok(())
}

/// Index and value of the maximum. The first maximal entry wins ties.
fn argmax(p: &[f64]) -> (usize, f64) {
    let mut best = 0;
    for (i, &v) in p.iter().enumerate().skip(1) {
        if v > p[best] {
            best = i;
        }
    }
    (best, p[best])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::classifier::{Classifier, LogisticRegression, MultiClass};
    use crate::labels::LabelSet;
    use crate::vectorizer::{FeatureEncoder, FeatureVector, TfidfVectorizer, VectorizerArtifact};

    const LABELS: [&str; 3] = ["Pertanyaan", "Konsep Fisika", "Penelitian"];

    fn label_set() -> LabelSet {
        LabelSet::new(LABELS.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn stopwords() -> Arc<StopwordSet> {
        Arc::new(StopwordSet::from_words(
            "indonesian",
            ["apakah", "sama", "dengan", "yang", "bagaimana", "tentang"],
        ))
    }

    /// Encoder that records every text it is asked to encode.
    struct RecordingEncoder {
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl FeatureEncoder for RecordingEncoder {
        fn dim(&self) -> usize {
            1
        }

        fn encode(&self, text: &str) -> Result<FeatureVector, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(text.to_string());
            Ok(FeatureVector::zeros(1))
        }
    }

    /// Classifier returning a fixed distribution.
    struct FixedClassifier {
        labels: LabelSet,
        proba: Vec<f64>,
        calls: Arc<AtomicUsize>,
    }

    impl Classifier for FixedClassifier {
        fn labels(&self) -> &LabelSet {
            &self.labels
        }

        fn n_features(&self) -> usize {
            1
        }

        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn predict_proba(&self, _x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.proba.clone())
        }
    }

    struct Stub {
        orchestrator: Orchestrator,
        encode_calls: Arc<AtomicUsize>,
        classify_calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    fn stub(proba: Vec<f64>) -> Stub {
        let encode_calls = Arc::new(AtomicUsize::new(0));
        let classify_calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let model = Model::new(
            Box::new(RecordingEncoder {
                calls: encode_calls.clone(),
                seen: seen.clone(),
            }),
            Box::new(FixedClassifier {
                labels: label_set(),
                proba,
                calls: classify_calls.clone(),
            }),
        )
        .unwrap();
        Stub {
            orchestrator: Orchestrator::new(ModelState::ready(model), stopwords()),
            encode_calls,
            classify_calls,
            seen,
        }
    }

    /// Real TF-IDF + logistic regression over a tiny physics vocabulary.
    fn physics_orchestrator() -> Orchestrator {
        let vocabulary = [
            "gravitasi",
            "gaya",
            "elektromagnetik",
            "konsep",
            "hukum",
            "penelitian",
            "eksperimen",
            "jurnal",
            "kenapa",
            "cara",
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), i))
        .collect();

        let vectorizer = TfidfVectorizer::from_artifact(VectorizerArtifact {
            vocabulary,
            idf: Some(vec![1.2, 1.1, 1.9, 1.4, 1.3, 1.6, 1.7, 2.0, 1.5, 1.5]),
            ngram_range: (1, 1),
            lowercase: true,
            binary: false,
            sublinear_tf: false,
            norm: Some(crate::vectorizer::Norm::L2),
        })
        .unwrap();

        let classifier = LogisticRegression::new(
            LABELS.iter().map(|s| s.to_string()).collect(),
            vec![
                vec![0.3, 0.2, 0.1, 0.0, 0.0, -0.5, -0.3, -0.4, 2.0, 1.8],
                vec![1.5, 1.4, 1.6, 1.8, 1.7, -0.2, 0.0, -0.6, -0.3, -0.2],
                vec![-0.4, -0.3, 0.2, -0.2, -0.1, 2.2, 1.9, 2.1, -0.5, -0.4],
            ],
            vec![0.1, 0.0, -0.1],
            MultiClass::Multinomial,
        )
        .unwrap();

        let model = Model::new(Box::new(vectorizer), Box::new(classifier)).unwrap();
        Orchestrator::new(ModelState::ready(model), stopwords())
    }

    fn failed() -> Orchestrator {
        Orchestrator::new(ModelState::failed("cannot read models/vectorizer.json"), stopwords())
    }

    #[test]
    fn scenario_question_about_gravity() {
        let orch = physics_orchestrator();
        let result = orch
            .classify_one("Apakah gravitasi sama dengan gaya elektromagnetik?")
            .unwrap();

        assert!(LABELS.contains(&result.label.as_str()));
        assert_eq!(result.label, "Konsep Fisika");
        assert_eq!(result.probabilities.len(), 3);
        assert!((result.probabilities.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_text_reaches_encoder() {
        let s = stub(vec![0.2, 0.5, 0.3]);
        s.orchestrator
            .classify_one("Apakah gravitasi sama dengan gaya elektromagnetik?")
            .unwrap();
        assert_eq!(
            *s.seen.lock().unwrap(),
            vec!["gravitasi gaya elektromagnetik"]
        );
    }

    #[test]
    fn fully_filtered_text_still_classified() {
        let s = stub(vec![0.2, 0.5, 0.3]);
        let result = s.orchestrator.classify_one("apakah sama?").unwrap();
        assert_eq!(result.label, "Konsep Fisika");
        assert_eq!(*s.seen.lock().unwrap(), vec![""]);
    }

    #[test]
    fn probability_map_is_complete() {
        let orch = physics_orchestrator();
        for text in [
            "Bagaimana cara kerja gaya gravitasi?",
            "Penelitian eksperimen jurnal fisika",
            "kenapa langit biru",
            "!!!",
        ] {
            let result = orch.classify_one(text).unwrap();
            assert_eq!(result.probabilities.len(), LABELS.len());
            let labels: Vec<&str> = result.probabilities.iter().map(|(l, _)| l).collect();
            assert_eq!(labels, LABELS);
            assert!(result.probabilities.iter().all(|(_, p)| (0.0..=1.0).contains(&p)));
            assert!((result.probabilities.total() - 1.0).abs() < 1e-6);

            let max = result
                .probabilities
                .iter()
                .map(|(_, p)| p)
                .fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(result.confidence, max);
            assert_eq!(result.probabilities.get(&result.label), Some(max));
        }
    }

    #[test]
    fn ties_resolve_to_first_declared_label() {
        let s = stub(vec![0.4, 0.4, 0.2]);
        let result = s.orchestrator.classify_one("gaya gravitasi").unwrap();
        assert_eq!(result.label, "Pertanyaan");
        assert_eq!(result.confidence, 0.4);

        let s = stub(vec![0.2, 0.4, 0.4]);
        assert_eq!(s.orchestrator.classify_one("gaya").unwrap().label, "Konsep Fisika");

        let third = 1.0 / 3.0;
        let s = stub(vec![third, third, third]);
        assert_eq!(s.orchestrator.classify_one("gaya").unwrap().label, "Pertanyaan");
    }

    #[test]
    fn deterministic_results() {
        let orch = physics_orchestrator();
        let text = "Penelitian tentang hukum gravitasi dan gaya";
        let first = orch.classify_one(text).unwrap();
        let first_json = serde_json::to_string(&first).unwrap();
        for _ in 0..20 {
            let again = orch.classify_one(text).unwrap();
            assert_eq!(again, first);
            assert_eq!(serde_json::to_string(&again).unwrap(), first_json);
        }
    }

    #[test]
    fn empty_text_rejected_before_encoding() {
        let s = stub(vec![0.2, 0.5, 0.3]);
        let err = s.orchestrator.classify_one("").unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidInput(_)));
        assert_eq!(s.encode_calls.load(Ordering::SeqCst), 0);
        assert_eq!(s.classify_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_batch_rejected() {
        let s = stub(vec![0.2, 0.5, 0.3]);
        let texts: Vec<String> = Vec::new();
        let err = s.orchestrator.classify_batch(&texts).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidInput(_)));
        assert_eq!(s.encode_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unavailable_model_short_circuits() {
        let orch = failed();
        assert!(!orch.is_ready());

        let err = orch.classify_one("gaya gravitasi").unwrap_err();
        assert!(matches!(err, ClassifyError::ModelUnavailable(_)));

        // Model availability is checked before input validation.
        let err = orch.classify_one("").unwrap_err();
        assert!(matches!(err, ClassifyError::ModelUnavailable(_)));

        let err = orch.classify_batch(&["gaya"]).unwrap_err();
        assert!(matches!(err, ClassifyError::ModelUnavailable(_)));

        let empty: [&str; 0] = [];
        let err = orch.classify_batch(&empty).unwrap_err();
        assert!(matches!(err, ClassifyError::ModelUnavailable(ref cause) if cause.contains("vectorizer")));
    }

    #[test]
    fn batch_preserves_order() {
        let orch = physics_orchestrator();
        let texts = [
            "Penelitian eksperimen jurnal",
            "kenapa dan bagaimana cara",
            "konsep hukum gravitasi",
        ];
        let items = orch.classify_batch(&texts).unwrap();
        assert_eq!(items.len(), 3);
        for (item, text) in items.iter().zip(texts) {
            assert_eq!(item.text, text);
        }
        assert_eq!(items[0].label, "Penelitian");
        assert_eq!(items[1].label, "Pertanyaan");
        assert_eq!(items[2].label, "Konsep Fisika");
    }

    #[test]
    fn batch_of_one_matches_single() {
        let orch = physics_orchestrator();
        let text = "Apakah gravitasi sama dengan gaya elektromagnetik?";
        let single = orch.classify_one(text).unwrap();
        let batch = orch.classify_batch(&[text]).unwrap();
        assert_eq!(batch[0].label, single.label);
        assert_eq!(batch[0].confidence, single.confidence);
    }

    #[test]
    fn batch_classifies_empty_item_in_place() {
        let s = stub(vec![0.2, 0.5, 0.3]);
        let items = s
            .orchestrator
            .classify_batch(&["gaya", "", "gravitasi"])
            .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[1].text, "");
        assert_eq!(items[1].label, "Konsep Fisika");
        assert_eq!(items[1].confidence, 0.5);
        assert_eq!(s.encode_calls.load(Ordering::SeqCst), 3);
        assert_eq!(*s.seen.lock().unwrap(), vec!["gaya", "", "gravitasi"]);
    }

    #[test]
    fn batch_empty_item_uses_zero_vector() {
        let orch = physics_orchestrator();
        let items = orch.classify_batch(&["konsep hukum gravitasi", ""]).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "Konsep Fisika");

        // Zero vector: the largest intercept decides.
        assert_eq!(items[1].text, "");
        assert_eq!(items[1].label, "Pertanyaan");
    }

    #[test]
    fn malformed_distribution_is_inference_failure() {
        let s = stub(vec![0.5, 0.5]);
        let err = s.orchestrator.classify_one("gaya").unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::InferenceFailure(InferenceError::MalformedDistribution(_))
        ));

        let s = stub(vec![0.7, 0.7, -0.4]);
        assert!(matches!(
            s.orchestrator.classify_one("gaya").unwrap_err(),
            ClassifyError::InferenceFailure(_)
        ));

        let s = stub(vec![0.5, 0.2, 0.2]);
        assert!(s.orchestrator.classify_batch(&["gaya"]).is_err());
    }

    #[test]
    fn argmax_first_wins() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9]), (1, 0.9));
        assert_eq!(argmax(&[1.0]), (0, 1.0));
    }
}

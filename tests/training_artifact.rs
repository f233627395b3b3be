use irisnet::{
    config::TrainingConfig,
    domain::{IrisClass, IrisFeatures},
    ml::{iris_dataset, DenseNetwork, IrisClassifier, Trainer},
    IrisError,
};
use std::path::PathBuf;

fn artifact_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("irisnet-test-{}", std::process::id()))
        .join(name)
}

fn quick_config() -> TrainingConfig {
    TrainingConfig {
        epochs: 200,
        learning_rate: 0.01,
        hidden_dim: 16,
        test_fraction: 0.2,
        seed: 7,
    }
}

#[test]
fn saved_artifact_reloads_with_same_predictions() {
    let outcome = Trainer::new(quick_config()).train().unwrap();
    let path = artifact_path("roundtrip.json");
    outcome.network.to_file(&path).unwrap();

    let trained = IrisClassifier::new(outcome.network).unwrap();
    let loaded = IrisClassifier::load(&path).unwrap();

    let records: Vec<IrisFeatures> = iris_dataset()
        .iter()
        .map(|s| IrisFeatures::new(s.features[0], s.features[1], s.features[2], s.features[3]))
        .collect();
    assert_eq!(
        trained.predict(&records).unwrap(),
        loaded.predict(&records).unwrap()
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
fn trained_model_fits_the_full_dataset() {
    let outcome = Trainer::new(quick_config()).train().unwrap();
    let classifier = IrisClassifier::new(outcome.network).unwrap();

    let data = iris_dataset();
    let records: Vec<IrisFeatures> = data
        .iter()
        .map(|s| IrisFeatures::new(s.features[0], s.features[1], s.features[2], s.features[3]))
        .collect();
    let predicted = classifier.predict(&records).unwrap();
    let correct = predicted
        .iter()
        .zip(&data)
        .filter(|(p, s)| p.index() == s.label)
        .count();
    assert!(correct >= 135, "only {correct}/150 correct");

    // Every setosa is linearly separable from the rest.
    assert!(predicted[..50].iter().all(|c| *c == IrisClass::Setosa));
}

#[test]
fn default_config_trains_and_records_metadata() {
    let outcome = Trainer::new(TrainingConfig::default()).train().unwrap();
    assert_eq!(outcome.history.len(), 100);
    assert_eq!(outcome.network.layers[0].out_dim(), 50);
    assert_eq!(outcome.network.metadata["epochs"], 100);
    assert_eq!(outcome.network.metadata["seed"], 2);
    assert!(outcome.network.metadata["trained_at"].is_string());
}

#[test]
fn missing_artifact_is_an_io_error() {
    let err = IrisClassifier::load(artifact_path("absent.json")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("absent.json"), "{message}");
    assert!(message.contains("IO error"), "{message}");
    match err {
        IrisError::Other(inner) => {
            assert!(matches!(inner.downcast_ref::<IrisError>(), Some(IrisError::Io(_))));
        }
        other => panic!("expected context-wrapped io error, got {other:?}"),
    }
}

#[test]
fn corrupt_artifact_is_rejected() {
    let path = artifact_path("corrupt.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();

    std::fs::write(&path, "{\"input_dim\": 4, \"layers\": []}").unwrap();
    assert!(matches!(
        DenseNetwork::from_file(&path),
        Err(IrisError::Validation(_))
    ));

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(
        DenseNetwork::from_file(&path),
        Err(IrisError::Json(_))
    ));

    let _ = std::fs::remove_file(&path);
}

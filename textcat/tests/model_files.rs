use std::fs;

use textcat::errors::CategorizerError;
use textcat::serialization::PURE_MODEL_TAG;
use textcat::{
    MulticlassLinearDecisionFunction, TextCategorizer, TotalWordFeatureExtractor,
    WordFeatureExtractor, NUM_SHAPE_FEATURES,
};

fn build_categorizer() -> TextCategorizer {
    let fe = TotalWordFeatureExtractor::new(
        2,
        vec![
            "team".to_string(),
            "score".to_string(),
            "senate".to_string(),
            "bill".to_string(),
        ],
        vec![vec![1., 0.], vec![0.5, 0.], vec![0., 1.], vec![0., 0.5]],
    )
    .unwrap();
    assert_eq!(2 + NUM_SHAPE_FEATURES, fe.num_dimensions());

    // "news" only looks at the leading-uppercase flag.
    let df = MulticlassLinearDecisionFunction::new(
        vec![0, 1, 2],
        vec![vec![2., 0.], vec![0., 2.], vec![0., 0., 0.75]],
        vec![0., 0., 0.25],
    )
    .unwrap();
    TextCategorizer::new(
        vec!["sports".into(), "politics".into(), "news".into()],
        fe,
        df,
    )
    .unwrap()
}

const SENTENCES: &[&[&str]] = &[
    &["the", "team", "score"],
    &["senate", "passes", "bill"],
    &["Breaking"],
    &["Team", "Senate"],
    &[],
];

#[test]
fn test_save_and_load_files() {
    let dir = tempfile::tempdir().unwrap();
    let pure_model_path = dir.path().join("text_categorizer_pure_model.dat");
    let extractor_path = dir.path().join("total_word_feature_extractor.dat");
    let categorizer = build_categorizer();

    categorizer
        .save_files(&pure_model_path, &extractor_path)
        .unwrap();
    let loaded = TextCategorizer::from_files(&pure_model_path, &extractor_path).unwrap();

    assert_eq!(categorizer.fingerprint(), loaded.fingerprint());
    for &sentence in SENTENCES {
        assert_eq!(
            categorizer.predict_with_score(sentence).unwrap(),
            loaded.predict_with_score(sentence).unwrap(),
        );
    }
    assert_eq!(0, loaded.predict(&["the", "team", "score"]).unwrap());
    assert_eq!(1, loaded.predict(&["senate", "passes", "bill"]).unwrap());
    assert_eq!(2, loaded.predict(&["Breaking"]).unwrap());
}

#[test]
fn test_save_and_load_bundled_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("text_categorizer.dat");
    let categorizer = build_categorizer();

    let mut buf = vec![];
    categorizer.write(&mut buf).unwrap();
    fs::write(&path, buf).unwrap();
    let loaded = TextCategorizer::read(fs::File::open(&path).unwrap()).unwrap();

    assert_eq!(categorizer.tag_names(), loaded.tag_names());
    for &sentence in SENTENCES {
        assert_eq!(
            categorizer.predict(sentence).unwrap(),
            loaded.predict(sentence).unwrap(),
        );
    }
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let extractor_path = dir.path().join("total_word_feature_extractor.dat");
    let categorizer = build_categorizer();
    categorizer
        .write_extractor(fs::File::create(&extractor_path).unwrap())
        .unwrap();

    let err = TextCategorizer::from_files(dir.path().join("missing.dat"), &extractor_path)
        .err()
        .unwrap();

    assert!(matches!(err, CategorizerError::IOError(_)));
}

#[test]
fn test_extractor_file_given_as_pure_model() {
    let dir = tempfile::tempdir().unwrap();
    let pure_model_path = dir.path().join("text_categorizer_pure_model.dat");
    let extractor_path = dir.path().join("total_word_feature_extractor.dat");
    build_categorizer()
        .save_files(&pure_model_path, &extractor_path)
        .unwrap();

    let err = TextCategorizer::from_files(&extractor_path, &extractor_path)
        .err()
        .unwrap();

    match err {
        CategorizerError::FormatMismatch(e) => {
            assert_eq!("mitie::total_word_feature_extractor", e.found());
            assert!(e.to_string().contains(PURE_MODEL_TAG));
        }
        e => panic!("unexpected error: {e}"),
    }
}

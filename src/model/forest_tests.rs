//! Unit tests for the random forest classifier.

#[cfg(test)]
mod forest_tests {
    use crate::error::ModelError;
    use crate::model::classifier::{validate_training_set, Classifier};
    use crate::model::forest::{ForestParams, RandomForestClassifier};

    fn separable() -> (Vec<Vec<f64>>, Vec<i64>) {
        let features = vec![
            vec![0.0, 5.0],
            vec![1.0, 4.0],
            vec![2.0, 6.0],
            vec![3.0, 5.5],
            vec![10.0, 5.0],
            vec![11.0, 4.5],
            vec![12.0, 6.0],
            vec![13.0, 5.2],
        ];
        let labels = vec![-1, -1, -1, -1, 1, 1, 1, 1];
        (features, labels)
    }

    // ============= Fit / Predict Tests =============

    #[test]
    fn test_learns_separable_classes() {
        let (features, labels) = separable();
        let model = RandomForestClassifier::default().fit(&features, &labels).unwrap();

        assert_eq!(model.n_features(), 2);

        let low = model.predict(&[0.5, 5.0]).unwrap();
        assert_eq!(low.label, -1);
        assert!(low.confidence() > 0.5);

        let high = model.predict(&[12.5, 5.0]).unwrap();
        assert_eq!(high.label, 1);
        assert!(high.confidence() > 0.5);
    }

    #[test]
    fn test_probabilities_cover_sorted_classes() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0], vec![6.0]];
        let labels = vec![1, 0, -1, 1, 0, -1];
        let model = RandomForestClassifier::default().fit(&features, &labels).unwrap();

        let prediction = model.predict(&[3.5]).unwrap();
        let classes: Vec<i64> = prediction.probabilities.iter().map(|&(c, _)| c).collect();
        assert_eq!(classes, vec![-1, 0, 1]);

        let total: f64 = prediction.probabilities.iter().map(|&(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(prediction.probabilities.iter().all(|&(_, p)| (0.0..=1.0).contains(&p)));
        assert!(classes.contains(&prediction.label));
    }

    #[test]
    fn test_single_class_is_certain() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let labels = vec![0, 0, 0];
        let model = RandomForestClassifier::default().fit(&features, &labels).unwrap();

        let prediction = model.predict(&[100.0, -100.0]).unwrap();
        assert_eq!(prediction.label, 0);
        assert_eq!(prediction.confidence(), 1.0);
    }

    #[test]
    fn test_fit_is_deterministic_for_seed() {
        let features = vec![
            vec![100.0, 101.0, 99.0, 100.5, 1000.0],
            vec![101.0, 103.0, 100.0, 102.0, 1200.0],
            vec![102.0, 104.0, 101.0, 103.5, 1100.0],
            vec![103.0, 104.5, 102.0, 104.0, 900.0],
            vec![104.0, 105.0, 103.0, 104.5, 800.0],
        ];
        let labels = vec![1, 1, 0, -1, -1];
        let params = ForestParams {
            seed: 7,
            ..ForestParams::default()
        };

        let a = RandomForestClassifier::new(params.clone()).fit(&features, &labels).unwrap();
        let b = RandomForestClassifier::new(params).fit(&features, &labels).unwrap();

        for row in &features {
            assert_eq!(a.predict(row).unwrap(), b.predict(row).unwrap());
        }
    }

    #[test]
    fn test_depth_zero_predicts_majority() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]];
        let labels = vec![1, 1, 1, 1, -1];
        let params = ForestParams {
            max_depth: Some(0),
            ..ForestParams::default()
        };
        let model = RandomForestClassifier::new(params).fit(&features, &labels).unwrap();

        // Every tree is a single leaf, so the row does not matter.
        assert_eq!(model.predict(&[5.0]).unwrap().label, 1);
        assert_eq!(model.predict(&[-50.0]).unwrap().label, 1);
    }

    #[test]
    fn test_constant_features_do_not_split() {
        let features = vec![vec![1.0, 1.0]; 6];
        let labels = vec![1, -1, 1, -1, 1, -1];
        let model = RandomForestClassifier::default().fit(&features, &labels).unwrap();

        let prediction = model.predict(&[1.0, 1.0]).unwrap();
        assert!(prediction.label == 1 || prediction.label == -1);
        assert!(prediction.confidence() >= 0.5);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (features, labels) = separable();
        let model = RandomForestClassifier::default().fit(&features, &labels).unwrap();

        let err = model.predict(&[1.0]).unwrap_err();
        assert_eq!(err, ModelError::FeatureWidthMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn test_name() {
        assert_eq!(RandomForestClassifier::default().name(), "RandomForestClassifier");
    }

    // ============= Dataset Validation Tests =============

    #[test]
    fn test_validate_training_set() {
        assert_eq!(validate_training_set(&[vec![1.0, 2.0]], &[1]), Ok(2));

        assert_eq!(
            validate_training_set(&[vec![1.0]], &[1, 0]),
            Err(ModelError::LengthMismatch { features: 1, labels: 2 })
        );
        assert_eq!(validate_training_set(&[], &[]), Err(ModelError::EmptyDataset));
        assert_eq!(validate_training_set(&[vec![]], &[1]), Err(ModelError::EmptyFeatureRow));
        assert_eq!(
            validate_training_set(&[vec![1.0, 2.0], vec![3.0]], &[1, 0]),
            Err(ModelError::RaggedFeatures { row: 1, expected: 2, found: 1 })
        );
        assert_eq!(
            validate_training_set(&[vec![f64::INFINITY]], &[1]),
            Err(ModelError::NonFiniteFeature)
        );
    }

    #[test]
    fn test_fit_rejects_invalid_dataset() {
        let result = RandomForestClassifier::default().fit(&[], &[]);
        assert!(matches!(result, Err(ModelError::EmptyDataset)));
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use asktell::{
    AskTellOptimizer, BoxSpace, Error, Record, Tag, TrainableProbabilisticModel, OBJECTIVE,
};

use crate::support::{
    mk_dataset, objective_dataset, objective_model, CountingRule, FailingRule, FixedRule,
    LinearModel,
};

fn unit_space() -> BoxSpace {
    BoxSpace::new(vec![-1.0], vec![1.0]).unwrap()
}

fn init_dataset() -> asktell::Dataset {
    mk_dataset(vec![vec![0.0]], vec![vec![0.0]])
}

#[test]
fn test_ask_suggests_new_point() {
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();

    let points = ask_tell.ask().unwrap();

    assert_eq!(points.len(), 1);
}

#[test]
fn test_default_rule_suggests_new_point() {
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .build()
        .unwrap();

    let points = ask_tell.ask().unwrap();

    assert_eq!(points.len(), 1);
    assert!(ask_tell.search_space().contains(&points[0]));
}

#[test]
fn test_tell_updates_state_with_new_data() {
    let init = init_dataset();
    let new_data = mk_dataset(vec![vec![1.0]], vec![vec![1.0]]);
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init.clone())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();

    ask_tell.tell(new_data.clone()).unwrap();
    let record = ask_tell.to_record(true).unwrap();

    assert_eq!(record.dataset().unwrap(), &init.concat(&new_data).unwrap());
}

#[test]
fn test_tell_trains_model() {
    let model = Arc::new(LinearModel::new());
    let shared: Arc<dyn TrainableProbabilisticModel> = model.clone();
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .models(objective_model(shared))
        .rule(FixedRule::new(vec![vec![0.0]]))
        .fit_model(false)
        .build()
        .unwrap();

    ask_tell.tell(mk_dataset(vec![vec![1.0]], vec![vec![1.0]])).unwrap();

    assert_eq!(model.optimize_count(), 1);
    assert_eq!(model.update_count(), 1);
}

#[test]
fn test_fit_model_controls_initial_training() {
    for fit_model in [true, false] {
        let model = Arc::new(LinearModel::new());
        let shared: Arc<dyn TrainableProbabilisticModel> = model.clone();
        let _ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
            .dataset(init_dataset())
            .models(objective_model(shared))
            .rule(FixedRule::new(vec![vec![0.0]]))
            .fit_model(fit_model)
            .build()
            .unwrap();

        assert_eq!(model.optimize_count(), usize::from(fit_model));
        assert_eq!(model.update_count(), usize::from(fit_model));
    }
}

#[test]
fn test_from_record_does_not_train_model() {
    let model = Arc::new(LinearModel::new());
    let shared: Arc<dyn TrainableProbabilisticModel> = model.clone();
    let record = Record::new(objective_dataset(init_dataset()), objective_model(shared), None);

    let ask_tell: AskTellOptimizer =
        AskTellOptimizer::from_record(record, unit_space(), FixedRule::new(vec![vec![0.0]]))
            .unwrap();

    assert_eq!(model.optimize_count(), 0);
    assert_eq!(ask_tell.dataset().unwrap(), &init_dataset());
}

#[test]
fn test_uses_specified_acquisition_state() {
    for (starting_state, expected) in [(None, 1_i64), (Some(0), 1), (Some(3), 4)] {
        let (rule, states_received) = CountingRule::new();
        let mut builder = AskTellOptimizer::builder(unit_space())
            .dataset(init_dataset())
            .model(LinearModel::new())
            .rule(rule);
        if let Some(state) = starting_state {
            builder = builder.acquisition_state(state);
        }
        let mut ask_tell = builder.build().unwrap();

        let _ = ask_tell.ask().unwrap();

        assert_eq!(ask_tell.acquisition_state(), Some(&expected));
        let record = ask_tell.to_record(true).unwrap();
        assert_eq!(record.acquisition_state, Some(expected));
        assert_eq!(*states_received.lock(), vec![starting_state]);
    }
}

#[test]
fn test_state_is_threaded_across_asks() {
    let (rule, states_received) = CountingRule::new();
    let mut ask_tell = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(rule)
        .build()
        .unwrap();

    let _ = ask_tell.ask().unwrap();
    let _ = ask_tell.ask().unwrap();
    let _ = ask_tell.ask().unwrap();

    assert_eq!(ask_tell.acquisition_state(), Some(&3));
    assert_eq!(*states_received.lock(), vec![None, Some(1), Some(2)]);
}

#[test]
fn test_does_not_accept_empty_datasets_or_models() {
    let no_datasets: asktell::Result<AskTellOptimizer> = AskTellOptimizer::builder(unit_space())
        .model(LinearModel::new())
        .build();
    assert!(matches!(no_datasets, Err(Error::EmptyDatasets)));

    let no_models: asktell::Result<AskTellOptimizer> = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .build();
    assert!(matches!(no_models, Err(Error::EmptyModels)));
}

#[test]
fn test_construction_validates_keys() {
    let datasets = HashMap::from([(Tag::new("1"), init_dataset())]);
    let models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>> =
        HashMap::from([(Tag::new("2"), Arc::new(LinearModel::new()) as _)]);

    let result: asktell::Result<AskTellOptimizer> = AskTellOptimizer::builder(unit_space())
        .datasets(datasets)
        .models(models)
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build();

    match result {
        Err(Error::TagMismatch {
            dataset_tags,
            model_tags,
        }) => {
            assert_eq!(dataset_tags, vec![Tag::new("1")]);
            assert_eq!(model_tags, vec![Tag::new("2")]);
        }
        other => panic!("expected TagMismatch, got {other:?}"),
    }
}

#[test]
fn test_tell_validates_keys() {
    let init = init_dataset();
    let datasets = HashMap::from([(Tag::new("1"), init.clone())]);
    let models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>> =
        HashMap::from([(Tag::new("1"), Arc::new(LinearModel::new()) as _)]);
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .datasets(datasets)
        .models(models)
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();

    let new_data = HashMap::from([(Tag::new("2"), mk_dataset(vec![vec![1.0]], vec![vec![1.0]]))]);
    let err = ask_tell.tell(new_data).unwrap_err();

    match err {
        Error::UnknownTag(tag) => assert_eq!(tag, Tag::new("2")),
        other => panic!("expected UnknownTag, got {other:?}"),
    }
    assert_eq!(ask_tell.datasets()[&Tag::new("1")], init);
}

#[test]
fn test_failed_tell_leaves_all_datasets_unchanged() {
    let init = init_dataset();
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init.clone())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();

    // One valid tag and one unknown tag: nothing may be applied.
    let new_data = HashMap::from([
        (OBJECTIVE, mk_dataset(vec![vec![1.0]], vec![vec![1.0]])),
        (Tag::new("X"), mk_dataset(vec![vec![2.0]], vec![vec![2.0]])),
    ]);
    let err = ask_tell.tell(new_data).unwrap_err();

    assert!(matches!(err, Error::UnknownTag(tag) if tag == Tag::new("X")));
    assert_eq!(ask_tell.dataset().unwrap(), &init);
}

#[test]
fn test_default_rule_requires_objective_tag() {
    let wrong_tag = Tag::new("OBJECTIVE_WRONG");
    let datasets = HashMap::from([(wrong_tag.clone(), init_dataset())]);
    let models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>> =
        HashMap::from([(wrong_tag.clone(), Arc::new(LinearModel::new()) as _)]);

    let result: asktell::Result<AskTellOptimizer> = AskTellOptimizer::builder(unit_space())
        .datasets(datasets)
        .models(models)
        .build();

    assert!(matches!(
        result,
        Err(Error::DefaultRuleTags { tags }) if tags == vec![wrong_tag]
    ));
}

#[test]
fn test_uncopyable_model() {
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::uncopyable())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();

    let err = ask_tell.to_result(true).unwrap_err();
    assert!(matches!(err, Error::CopyUnsupported { tag } if tag == OBJECTIVE));
    assert!(ask_tell.to_result(false).unwrap().is_ok());

    ask_tell.tell(mk_dataset(vec![vec![1.0]], vec![vec![1.0]])).unwrap();

    let err = ask_tell.to_result(true).unwrap_err();
    assert!(matches!(err, Error::CopyUnsupported { tag } if tag == OBJECTIVE));
    assert!(ask_tell.to_result(false).unwrap().is_ok());
}

#[test]
fn test_rule_failure_propagates() {
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(FailingRule)
        .build()
        .unwrap();

    let err = ask_tell.ask().unwrap_err();

    assert!(matches!(err, Error::External(_)));
    assert!(ask_tell.acquisition_state().is_none());
}

#[test]
fn test_training_failure_propagates_from_construction() {
    let result: asktell::Result<AskTellOptimizer> = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::failing())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build();

    assert!(matches!(result, Err(Error::External(_))));
}

#[test]
fn test_training_failure_propagates_from_tell() {
    let init = init_dataset();
    let new_data = mk_dataset(vec![vec![1.0]], vec![vec![1.0]]);
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init.clone())
        .model(LinearModel::failing())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .fit_model(false)
        .build()
        .unwrap();

    let err = ask_tell.tell(new_data.clone()).unwrap_err();

    assert!(matches!(err, Error::External(_)));
    // Datasets are replaced before retraining, so the new data is in.
    assert_eq!(ask_tell.dataset().unwrap(), &init.concat(&new_data).unwrap());
}

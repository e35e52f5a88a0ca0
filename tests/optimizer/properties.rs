use std::collections::HashMap;
use std::sync::Arc;

use asktell::{AskTellOptimizer, BoxSpace, Error, Tag, TrainableProbabilisticModel, OBJECTIVE};

use crate::support::{mk_dataset, objective_model, FixedRule, LinearModel};

fn unit_space() -> BoxSpace {
    BoxSpace::new(vec![-1.0], vec![1.0]).unwrap()
}

fn init_dataset() -> asktell::Dataset {
    mk_dataset(vec![vec![0.0]], vec![vec![0.0]])
}

fn two_tag_optimizer() -> AskTellOptimizer {
    let datasets = HashMap::from([
        (OBJECTIVE, init_dataset()),
        (Tag::new("X"), init_dataset()),
    ]);
    let models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>> = HashMap::from([
        (OBJECTIVE, Arc::new(LinearModel::new()) as _),
        (Tag::new("X"), Arc::new(LinearModel::new()) as _),
    ]);
    AskTellOptimizer::builder(unit_space())
        .datasets(datasets)
        .models(models)
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap()
}

#[test]
fn test_datasets_property_is_a_copy() {
    let ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();

    let mut datasets = ask_tell.datasets();
    assert_eq!(datasets[&OBJECTIVE], init_dataset());

    datasets.insert(Tag::new("EXTRA"), init_dataset());

    assert_eq!(ask_tell.datasets().len(), 1);
}

#[test]
fn test_single_value_accessors() {
    let model = Arc::new(LinearModel::new());
    let shared: Arc<dyn TrainableProbabilisticModel> = model.clone();
    let ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .models(objective_model(shared.clone()))
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();

    assert_eq!(ask_tell.dataset().unwrap(), &init_dataset());
    assert!(Arc::ptr_eq(ask_tell.model().unwrap(), &shared));
    assert!(Arc::ptr_eq(&ask_tell.models()[&OBJECTIVE], &shared));
}

#[test]
fn test_single_value_accessors_fail_with_multiple_tags() {
    let ask_tell = two_tag_optimizer();

    assert!(matches!(
        ask_tell.dataset(),
        Err(Error::AmbiguousTag { count: 2 })
    ));
    assert!(matches!(
        ask_tell.model(),
        Err(Error::AmbiguousTag { count: 2 })
    ));
}

#[test]
fn test_set_models_replaces_identity() {
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();
    let old = ask_tell.model().unwrap().clone();

    let replacement: Arc<dyn TrainableProbabilisticModel> = Arc::new(LinearModel::new());
    ask_tell
        .set_models(objective_model(replacement.clone()))
        .unwrap();

    assert!(Arc::ptr_eq(ask_tell.model().unwrap(), &replacement));
    assert!(!Arc::ptr_eq(ask_tell.model().unwrap(), &old));
}

#[test]
fn test_set_models_rejects_empty_mapping() {
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();

    let result = ask_tell.set_models(HashMap::new());

    assert!(matches!(result, Err(Error::EmptyModels)));
}

#[test]
fn test_set_models_rejects_changed_tag_set() {
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();

    // Superset of the tracked tags.
    let superset: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>> = HashMap::from([
        (OBJECTIVE, Arc::new(LinearModel::new()) as _),
        (Tag::new("X"), Arc::new(LinearModel::new()) as _),
    ]);
    assert!(matches!(
        ask_tell.set_models(superset),
        Err(Error::TagSetChanged { .. })
    ));

    // Disjoint tag.
    let disjoint: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>> =
        HashMap::from([(Tag::new("CONSTRAINT"), Arc::new(LinearModel::new()) as _)]);
    assert!(matches!(
        ask_tell.set_models(disjoint),
        Err(Error::TagSetChanged { .. })
    ));

    // The tracked models were left untouched.
    assert_eq!(ask_tell.models().len(), 1);
    assert!(ask_tell.models().contains_key(&OBJECTIVE));
}

#[test]
fn test_set_model_replaces_the_objective_model() {
    let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();
    let old = ask_tell.model().unwrap().clone();

    ask_tell.set_model(LinearModel::new()).unwrap();

    assert!(!Arc::ptr_eq(ask_tell.model().unwrap(), &old));
}

#[test]
fn test_set_model_requires_objective_tag() {
    let datasets = HashMap::from([(Tag::new("X"), init_dataset())]);
    let models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>> =
        HashMap::from([(Tag::new("X"), Arc::new(LinearModel::new()) as _)]);
    let mut one_model: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .datasets(datasets)
        .models(models)
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();
    assert!(matches!(
        one_model.set_model(LinearModel::new()),
        Err(Error::TagSetChanged { .. })
    ));

    let mut two_models = two_tag_optimizer();
    assert!(matches!(
        two_models.set_model(LinearModel::new()),
        Err(Error::TagSetChanged { .. })
    ));
}

#[test]
fn test_acquisition_state_accessor() {
    let ask_tell: AskTellOptimizer = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .build()
        .unwrap();
    assert!(ask_tell.acquisition_state().is_none());

    let with_state = AskTellOptimizer::builder(unit_space())
        .dataset(init_dataset())
        .model(LinearModel::new())
        .rule(FixedRule::new(vec![vec![0.0]]))
        .acquisition_state(7_i64)
        .build()
        .unwrap();
    assert_eq!(with_state.acquisition_state(), Some(&7));
}

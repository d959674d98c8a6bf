//! Integration tests for name-based component resolution
//!
//! Walks the container through the same shapes the API bootstrap uses:
//! plain values, model type tokens, singleton repositories and services, and
//! transient controllers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use skitrack_core::{
    Arguments, BoxError, Container, ContainerBuilder, ContainerError, Lifetime,
    RegistrationOptions, SingletonState, Target,
};

/// Stand-in for a model type token
#[derive(Debug, PartialEq)]
struct ModelType {
    collection: &'static str,
}

/// Repository holding the model it was built with
struct Repo {
    model: Arc<ModelType>,
}

/// Controller holding its repository
struct Ctrl {
    repo: Arc<Repo>,
}

fn scenario() -> Container {
    let mut builder = ContainerBuilder::new();

    builder
        .register("Conn", Target::value("mongodb://x"), None)
        .unwrap();
    builder
        .register(
            "ModelType",
            Target::value(ModelType { collection: "tours" }),
            Some(RegistrationOptions::new().type_ref()),
        )
        .unwrap();
    builder
        .register(
            "Repo",
            Target::factory(|args: &Arguments| {
                Ok(Repo {
                    model: args.get::<ModelType>(0)?,
                })
            }),
            Some(
                RegistrationOptions::new()
                    .dependencies(["ModelType"])
                    .singleton(),
            ),
        )
        .unwrap();
    builder
        .register(
            "Ctrl",
            Target::factory(|args: &Arguments| {
                Ok(Ctrl {
                    repo: args.get::<Repo>(0)?,
                })
            }),
            Some(RegistrationOptions::new().dependencies(["Repo"])),
        )
        .unwrap();

    builder.freeze().unwrap()
}

#[test]
fn test_value_registration_returns_identical_value() {
    let container = scenario();

    let first = container.resolve_as::<&str>("Conn").unwrap();
    let second = container.resolve_as::<&str>("Conn").unwrap();
    assert_eq!(*first, "mongodb://x");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(container.lifetime_of("Conn"), Some(Lifetime::Value));
}

#[test]
fn test_type_registration_is_handed_through() {
    let container = scenario();

    let model = container.resolve_as::<ModelType>("ModelType").unwrap();
    assert_eq!(model.collection, "tours");
    assert!(Arc::ptr_eq(
        &model,
        &container.resolve_as::<ModelType>("ModelType").unwrap()
    ));
}

#[test]
fn test_singleton_repository_shares_model() {
    let container = scenario();

    let repo1 = container.resolve_as::<Repo>("Repo").unwrap();
    let repo2 = container.resolve_as::<Repo>("Repo").unwrap();
    assert!(Arc::ptr_eq(&repo1, &repo2));

    let model = container.resolve_as::<ModelType>("ModelType").unwrap();
    assert!(Arc::ptr_eq(&repo1.model, &model));
}

#[test]
fn test_transient_controllers_share_singleton_repository() {
    let container = scenario();

    let ctrl1 = container.resolve_as::<Ctrl>("Ctrl").unwrap();
    let ctrl2 = container.resolve_as::<Ctrl>("Ctrl").unwrap();
    assert!(!Arc::ptr_eq(&ctrl1, &ctrl2));
    assert!(Arc::ptr_eq(&ctrl1.repo, &ctrl2.repo));
    assert!(Arc::ptr_eq(
        &ctrl1.repo,
        &container.resolve_as::<Repo>("Repo").unwrap()
    ));
}

#[test]
fn test_singleton_factory_runs_exactly_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let container = Container::builder()
        .add_singleton("Svc", Vec::<String>::new(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(String::from("svc"))
        })
        .unwrap()
        .freeze()
        .unwrap();

    assert_eq!(container.singleton_state("Svc"), Some(SingletonState::Unbuilt));
    for _ in 0..10 {
        container.resolve("Svc").unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(container.singleton_state("Svc"), Some(SingletonState::Built));
}

#[test]
fn test_transient_factory_runs_every_time() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let container = Container::builder()
        .add_transient("Ctrl", Vec::<String>::new(), move |_| {
            Ok(counter.fetch_add(1, Ordering::SeqCst))
        })
        .unwrap()
        .freeze()
        .unwrap();

    let a = container.resolve_as::<usize>("Ctrl").unwrap();
    let b = container.resolve_as::<usize>("Ctrl").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!((*a, *b), (0, 1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_singleton_chain_builds_leaf_first_once() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let recorder = |name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>| {
        let log = log.clone();
        move |_: &Arguments| -> Result<&'static str, BoxError> {
            log.lock().unwrap().push(name);
            Ok(name)
        }
    };

    let container = Container::builder()
        .add_singleton("A", ["B"], recorder("A", &log))
        .and_then(|b| b.add_singleton("B", ["C"], recorder("B", &log)))
        .and_then(|b| b.add_singleton("C", Vec::<String>::new(), recorder("C", &log)))
        .unwrap()
        .freeze()
        .unwrap();

    container.resolve("A").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["C", "B", "A"]);

    container.resolve("A").unwrap();
    container.resolve("B").unwrap();
    container.resolve("C").unwrap();
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
fn test_dependencies_injected_in_declared_order() {
    let container = Container::builder()
        .add_value("First", 1u32)
        .and_then(|b| b.add_value("Second", 2u32))
        .and_then(|b| b.add_value("Third", 3u32))
        .and_then(|b| {
            b.add_transient("Ordered", ["Third", "First", "Second"], |args| {
                let names: Vec<String> = (0..args.len())
                    .filter_map(|i| args.name(i).map(str::to_string))
                    .collect();
                let values = (0..args.len())
                    .map(|i| args.get::<u32>(i).map(|v| *v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((names, values))
            })
        })
        .unwrap()
        .freeze()
        .unwrap();

    let ordered = container
        .resolve_as::<(Vec<String>, Vec<u32>)>("Ordered")
        .unwrap();
    assert_eq!(ordered.0, vec!["Third", "First", "Second"]);
    assert_eq!(ordered.1, vec![3, 1, 2]);
}

#[test]
fn test_cycle_is_reported_not_overflowed() {
    let err = Container::builder()
        .add_transient("A", ["B"], |_| Ok(()))
        .and_then(|b| b.add_transient("B", ["A"], |_| Ok(())))
        .and_then(ContainerBuilder::freeze)
        .err()
        .unwrap();

    assert!(err.is_circular());
    assert_eq!(err.cycle().unwrap(), ["A", "B", "A"]);
    assert_eq!(err.to_string(), "Circular dependency detected: A -> B -> A");
}

#[test]
fn test_singleton_self_cycle_is_reported() {
    let err = Container::builder()
        .add_singleton("Loop", ["Loop"], |_| Ok(()))
        .and_then(ContainerBuilder::freeze)
        .err()
        .unwrap();

    assert_eq!(err.cycle().unwrap(), ["Loop", "Loop"]);
}

#[test]
fn test_unknown_names() {
    let container = scenario();

    let err = container.resolve("Nonexistent").unwrap_err();
    assert!(err.is_unknown());

    let container = Container::builder()
        .add_transient("AuthController", ["AuthServiceSingleton"], |_| Ok(()))
        .unwrap()
        .freeze()
        .unwrap();
    match container.resolve("AuthController").unwrap_err() {
        ContainerError::UnknownRegistration { name, required_by } => {
            assert_eq!(name, "AuthServiceSingleton");
            assert_eq!(required_by.as_deref(), Some("AuthController"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_construction_error_wraps_cause_and_caches_nothing() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let container = Container::builder()
        .add_value("Conn", "mongodb://x")
        .and_then(|b| {
            b.add_singleton("Repo", ["Conn"], move |_| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(std::io::Error::new(std::io::ErrorKind::Other, "connection refused").into())
                } else {
                    Ok(42u32)
                }
            })
        })
        .and_then(|b| b.add_transient("Ctrl", ["Repo"], |args| Ok(*args.get::<u32>(0)?)))
        .unwrap()
        .freeze()
        .unwrap();

    // Failure surfaces for the component that failed, even through a dependent.
    let err = container.resolve("Ctrl").unwrap_err();
    match &err {
        ContainerError::Construction { name, source } => {
            assert_eq!(name, "Repo");
            assert!(source.downcast_ref::<std::io::Error>().is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(container.singleton_state("Repo"), Some(SingletonState::Unbuilt));

    assert_eq!(*container.resolve_as::<u32>("Ctrl").unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_argument_type_mismatch_becomes_construction_error() {
    let container = Container::builder()
        .add_value("Conn", "mongodb://x")
        .and_then(|b| b.add_transient("Repo", ["Conn"], |args| Ok(*args.get::<u64>(0)?)))
        .unwrap()
        .freeze()
        .unwrap();

    match container.resolve("Repo").unwrap_err() {
        ContainerError::Construction { name, source } => {
            assert_eq!(name, "Repo");
            let cause = source.downcast_ref::<ContainerError>().unwrap();
            assert!(matches!(cause, ContainerError::TypeMismatch { name, .. } if name == "Conn"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_and_invalid_registrations() {
    let mut builder = ContainerBuilder::new();
    builder.register("Conn", Target::value("a"), None).unwrap();

    assert!(builder
        .register("Conn", Target::value("b"), None)
        .unwrap_err()
        .is_duplicate());
    assert!(builder
        .register("", Target::value("c"), None)
        .unwrap_err()
        .is_invalid());
    assert!(builder
        .register(
            "Weird",
            Target::value("d"),
            Some(RegistrationOptions::new().type_ref().singleton())
        )
        .unwrap_err()
        .is_invalid());
    assert_eq!(builder.len(), 1);
}

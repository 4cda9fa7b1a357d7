use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use super::*;
use crate::query::{BuiltQuery, Pagination};

fn ctx(op: Operation) -> InterceptorContext {
    InterceptorContext::new("Employee", op)
}

#[test]
fn test_hook_names_round_trip() {
    assert_eq!(LIFECYCLE_HOOKS.len(), 14);
    for hook in LIFECYCLE_HOOKS {
        assert_eq!(LifecycleHook::from_name(hook.name()), Some(hook));
    }
    assert_eq!(LifecycleHook::from_name("beforeSave"), None);
    assert_eq!(LifecycleHook::ExtendSchema.kind(), HookKind::Schema);
    assert_eq!(LifecycleHook::OnError.kind(), HookKind::Error);
    assert_eq!(LifecycleHook::AfterRead.kind(), HookKind::Lifecycle);
}

#[test]
fn test_hook_result_omits_unset_halt() {
    let value = serde_json::to_value(HookResult::pass(json!({ "a": 1 }))).unwrap();
    assert_eq!(value, json!({ "data": { "a": 1 } }));

    let halted = serde_json::to_value(HookResult::halt(json!(null), json!({ "ok": false }))).unwrap();
    assert_eq!(halted["halt"], json!(true));
    assert_eq!(halted["response"], json!({ "ok": false }));
}

#[test]
fn test_context_query_builder_only_on_read_path() {
    assert!(ctx(Operation::List).query_builder().is_some());
    assert!(ctx(Operation::Read).query_builder().is_some());
    assert!(ctx(Operation::Create).query_builder().is_none());

    let ignored = ctx(Operation::Update).with_query_builder(crate::query::QueryBuilder::new("Employee"));
    assert!(ignored.query_builder().is_none());
}

#[test]
fn test_context_transaction_downcast() {
    let tx: Transaction = Arc::new(42_u32);
    let ctx = ctx(Operation::Create).with_transaction(tx);
    assert_eq!(ctx.transaction_as::<u32>(), Some(&42));
    assert!(ctx.transaction_as::<String>().is_none());
}

#[tokio::test]
async fn test_noop_interceptor_passes_data_through() {
    let noop = create_noop_interceptor();
    let data = json!({ "name": "Ada" });

    for hook in LIFECYCLE_HOOKS {
        if hook.kind() != HookKind::Lifecycle {
            continue;
        }
        let result = noop.run(hook, data.clone(), ctx(Operation::Create)).await.unwrap();
        assert_eq!(result, HookResult::pass(data.clone()), "hook {hook}");
    }
}

#[test]
fn test_noop_extend_schema_returns_same_reference() {
    let noop = create_noop_interceptor();
    let schema: Schema = Arc::new(json!({ "type": "object" }));
    let extended = (noop.extend_schema)(Arc::clone(&schema));
    assert!(Arc::ptr_eq(&schema, &extended));
}

#[tokio::test]
async fn test_noop_on_error_reports_message() {
    let noop = create_noop_interceptor();
    let error: SharedError = Arc::new(anyhow::anyhow!("boom"));
    let result = (noop.on_error)(error, ctx(Operation::Create)).await.unwrap();
    assert_eq!(result.data, json!({ "error": "boom" }));
    assert!(!result.halt);
}

#[test]
fn test_validate_interceptor_cases() {
    assert!(!validate_interceptor(&InterceptorCandidate::from(Value::Null)));
    assert!(!validate_interceptor(&InterceptorCandidate::from(json!("x"))));
    assert!(validate_interceptor(&InterceptorCandidate::from(json!({}))));
    assert!(validate_interceptor(&InterceptorCandidate::from(json!({ "helper": 1 }))));
    assert!(!validate_interceptor(&InterceptorCandidate::from(
        json!({ "beforeCreate": "nope" })
    )));

    let table: InterceptorCandidate = [(
        "beforeCreate".to_string(),
        HookValue::Lifecycle(lifecycle_fn(|d, _| async move { Ok(HookResult::pass(d)) })),
    )]
    .into_iter()
    .collect();
    assert!(validate_interceptor(&table));

    let wrong_kind: InterceptorCandidate = [(
        "extendSchema".to_string(),
        HookValue::Lifecycle(lifecycle_fn(|d, _| async move { Ok(HookResult::pass(d)) })),
    )]
    .into_iter()
    .collect();
    assert!(!validate_interceptor(&wrong_kind));

    assert!(validate_interceptor(&InterceptorHooks::new().into()));
}

#[test]
fn test_candidate_rejections_name_the_problem() {
    let err = InterceptorCandidate::from(Value::Null).into_hooks().unwrap_err();
    assert_eq!(err, InterceptorError::NotAnObject { found: "null" });

    let err = InterceptorCandidate::from(json!({ "onError": 3 }))
        .into_hooks()
        .unwrap_err();
    assert!(matches!(err, InterceptorError::InvalidHook { hook: "onError", .. }));
    assert!(err.to_string().contains("onError"));
}

#[test]
fn test_table_ignores_unknown_keys() {
    let mut table = BTreeMap::new();
    table.insert("helper".to_string(), HookValue::Value(json!(true)));
    table.insert(
        "extendSchema".to_string(),
        HookValue::Schema(schema_fn(|s| s)),
    );
    let hooks = InterceptorCandidate::Table(table).into_hooks().unwrap();
    assert!(hooks.has(LifecycleHook::ExtendSchema));
    assert!(!hooks.has(LifecycleHook::BeforeCreate));
}

#[tokio::test]
async fn test_merge_with_defaults_keeps_custom_hooks() {
    let hooks = InterceptorHooks::new().before_create(|mut data, _ctx| async move {
        data["tagged"] = json!(true);
        Ok(HookResult::pass(data))
    });
    let merged = merge_with_defaults(&hooks);

    let created = merged
        .run(LifecycleHook::BeforeCreate, json!({}), ctx(Operation::Create))
        .await
        .unwrap();
    assert_eq!(created.data, json!({ "tagged": true }));

    let updated = merged
        .run(LifecycleHook::BeforeUpdate, json!({}), ctx(Operation::Update))
        .await
        .unwrap();
    assert_eq!(updated.data, json!({}));
}

#[test]
fn test_registry_resolves_noop_for_unknown_model() {
    let registry = InterceptorRegistry::new();
    assert!(registry.is_empty());
    let resolved = registry.resolve("Nobody");
    let schema: Schema = Arc::new(json!({}));
    assert!(Arc::ptr_eq(&schema, &(resolved.extend_schema)(Arc::clone(&schema))));
}

#[test]
fn test_registry_rejects_invalid_candidate() {
    let registry = InterceptorRegistry::new();
    let err = registry.register("Employee", Value::Null).unwrap_err();
    assert!(matches!(err, InterceptorError::NotAnObject { .. }));
    assert!(!registry.is_registered("Employee"));
}

#[tokio::test]
async fn test_registry_last_registration_wins() {
    let registry = InterceptorRegistry::new();
    for tag in ["first", "second"] {
        registry
            .register(
                "Employee",
                InterceptorHooks::new().before_create(move |_data, _ctx| async move {
                    Ok(HookResult::pass(json!(tag)))
                }),
            )
            .unwrap();
    }
    registry.register("Team", json!({})).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.models(), vec!["Employee".to_string(), "Team".to_string()]);

    let result = registry
        .resolve("Employee")
        .run(LifecycleHook::BeforeCreate, json!({}), ctx(Operation::Create))
        .await
        .unwrap();
    assert_eq!(result.data, json!("second"));

    registry.clear();
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_pipeline_completes_through_all_stages() {
    let hooks = InterceptorHooks::new()
        .before_create(|mut data, _ctx| async move {
            data["source"] = json!("api");
            Ok(HookResult::pass(data))
        })
        .after_create(|mut data, _ctx| async move {
            if let Some(map) = data.as_object_mut() {
                map.remove("secret");
            }
            Ok(HookResult::pass(data))
        });
    let registry = InterceptorRegistry::new();
    registry.register("Employee", hooks).unwrap();
    let pipeline = LifecyclePipeline::for_model(&registry, "Employee");

    let outcome = pipeline
        .run(ctx(Operation::Create), json!({ "name": "Ada" }), |data, _ctx| async move {
            let mut row = data;
            row["id"] = json!(1);
            row["secret"] = json!("x");
            Ok(row)
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        StageOutcome::Completed(json!({ "name": "Ada", "source": "api", "id": 1 }))
    );
}

#[tokio::test]
async fn test_before_hook_halt_skips_operation() {
    let writes = Arc::new(AtomicUsize::new(0));
    let hooks = InterceptorHooks::new().before_delete(|data, _ctx| async move {
        Ok(HookResult::halt(data, json!({ "status": 403 })))
    });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));

    let counter = Arc::clone(&writes);
    let outcome = pipeline
        .run(ctx(Operation::Delete), json!({ "id": 7 }), |data, _ctx| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(data)
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        StageOutcome::Halted {
            hook: LifecycleHook::BeforeDelete,
            response: json!({ "status": 403 }),
        }
    );
    assert_eq!(writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_after_hook_halt_reshapes_response() {
    let hooks = InterceptorHooks::new().after_update(|_data, _ctx| async move {
        Ok(HookResult::halt(json!(null), json!({ "updated": true })))
    });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));
    let outcome = pipeline
        .run(ctx(Operation::Update), json!({}), |data, _| async move { Ok(data) })
        .await
        .unwrap();
    assert_eq!(outcome.into_response(), json!({ "updated": true }));
}

#[tokio::test]
async fn test_default_on_error_does_not_recover() {
    let pipeline = LifecyclePipeline::new(Arc::new(create_noop_interceptor()));
    let err = pipeline
        .run(ctx(Operation::Create), json!({}), |_data, _| async move {
            Err::<Value, _>(anyhow::anyhow!("unique constraint"))
        })
        .await
        .unwrap_err();

    assert!(!err.is_fatal());
    assert_eq!(err.original().to_string(), "unique constraint");
}

#[tokio::test]
async fn test_on_error_can_recover() {
    let hooks = InterceptorHooks::new().on_error(|error, _ctx| async move {
        Ok(HookResult::pass(json!({ "status": 409, "message": error.to_string() })))
    });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));
    let outcome = pipeline
        .run(ctx(Operation::Create), json!({}), |_data, _| async move {
            Err::<Value, _>(anyhow::anyhow!("duplicate"))
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        StageOutcome::Recovered(json!({ "status": 409, "message": "duplicate" }))
    );
}

#[tokio::test]
async fn test_failing_on_error_is_fatal() {
    let hooks = InterceptorHooks::new()
        .before_create(|_data, _ctx| async move { Err::<HookResult, _>(anyhow::anyhow!("rejected")) })
        .on_error(|_error, _ctx| async move { Err::<HookResult, _>(anyhow::anyhow!("handler broke")) });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));
    let err = pipeline
        .run(ctx(Operation::Create), json!({}), |data, _| async move { Ok(data) })
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.original().to_string(), "rejected");
    assert!(err.to_string().contains("handler broke"));
}

#[tokio::test]
async fn test_on_error_rethrow_is_not_fatal() {
    let hooks = InterceptorHooks::new()
        .on_error(|error, _ctx| async move { Err::<HookResult, _>(rethrow(error)) });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));
    let err = pipeline
        .run(ctx(Operation::Update), json!({}), |_data, _| async move {
            Err::<Value, _>(anyhow::anyhow!("row is stale"))
        })
        .await
        .unwrap_err();

    assert!(!err.is_fatal());
    assert!(matches!(err, PipelineError::Unrecovered(_)));
    assert_eq!(err.original().to_string(), "row is stale");
}

#[tokio::test]
async fn test_on_error_reraising_same_message_is_not_fatal() {
    let hooks = InterceptorHooks::new().on_error(|error, _ctx| async move {
        Err::<HookResult, _>(anyhow::anyhow!("{error}").context("still failing"))
    });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));
    let err = pipeline
        .run(ctx(Operation::Create), json!({}), |_data, _| async move {
            Err::<Value, _>(anyhow::anyhow!("unique constraint"))
        })
        .await
        .unwrap_err();
    // A new message is a handler failure.
    assert!(err.is_fatal());

    let hooks = InterceptorHooks::new()
        .on_error(|error, _ctx| async move { Err::<HookResult, _>(anyhow::anyhow!("{error}")) });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));
    let err = pipeline
        .run(ctx(Operation::Create), json!({}), |_data, _| async move {
            Err::<Value, _>(anyhow::anyhow!("unique constraint"))
        })
        .await
        .unwrap_err();
    assert!(!err.is_fatal());
    assert_eq!(err.original().to_string(), "unique constraint");
}

#[tokio::test]
async fn test_rethrow_survives_added_context() {
    let hooks = InterceptorHooks::new().on_error(|error, _ctx| async move {
        Err::<HookResult, _>(rethrow(error).context("audit log"))
    });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));
    let err = pipeline
        .run(ctx(Operation::Delete), json!({}), |_data, _| async move {
            Err::<Value, _>(anyhow::anyhow!("foreign key"))
        })
        .await
        .unwrap_err();

    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_validate_uses_extended_schema() {
    let hooks = InterceptorHooks::new()
        .extend_schema(|schema| {
            let mut extended = (*schema).clone();
            extended["required"] = json!(["email"]);
            Arc::new(extended)
        })
        .after_validate(|mut data, _ctx| async move {
            data["validated"] = json!(true);
            Ok(HookResult::pass(data))
        });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));

    let outcome = pipeline
        .validate(
            ctx(Operation::Create),
            json!({ "email": "a@b.c" }),
            Arc::new(json!({ "type": "object" })),
            |schema, data| {
                assert_eq!(schema["required"], json!(["email"]));
                Ok(data)
            },
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        StageOutcome::Completed(json!({ "email": "a@b.c", "validated": true }))
    );
}

#[tokio::test]
async fn test_before_list_extends_query() {
    let hooks = InterceptorHooks::new().before_list(|data, ctx| async move {
        let existing: BuiltQuery = serde_json::from_value(data)?;
        let scoped = ctx
            .query_builder()
            .cloned()
            .unwrap_or_else(|| crate::query::QueryBuilder::new(&ctx.model_name))
            .where_(json!({ "tenantId": "t1" }))
            .merge_with(&existing);
        Ok::<_, anyhow::Error>(HookResult::pass(scoped.build().to_value()?))
    });
    let pipeline = LifecyclePipeline::new(Arc::new(merge_with_defaults(&hooks)));

    let initial = crate::query::QueryBuilder::new("Employee")
        .paginate(Pagination { page: 2, page_size: 10 })
        .build();
    let outcome = pipeline
        .run(ctx(Operation::List), initial.to_value().unwrap(), |query, _| async move {
            Ok(json!({ "executed": query }))
        })
        .await
        .unwrap();

    assert_eq!(
        outcome.into_response(),
        json!({ "executed": { "where": { "tenantId": "t1" }, "skip": 10, "take": 10 } })
    );
}

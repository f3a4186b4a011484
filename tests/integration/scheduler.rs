//! Serializability and lifecycle of the directory server.

use crate::common::{core_schema, dn, init_logging, scenario_entries, scenario_server};
use futures::future::join_all;
use ldap_dit::{
    ChangeOperation, DirectoryError, DirectoryOperation, DirectoryServerBuilder, Filter, OperationOutcome,
    ResultCode, SchedulerState, SearchScope,
};

#[tokio::test]
async fn test_read_modify_write_units_lose_no_updates() {
    init_logging();
    let server = scenario_server();
    let schema = core_schema();
    let target = dn(&schema, "dc=dev");

    let units = (0..50).map(|_| {
        let server = server.clone();
        let target = target.clone();
        async move {
            server
                .submit(move |dit| {
                    let current = dit
                        .get_entry(&target)?
                        .values(dit.schema(), "description")
                        .and_then(|values| values.first())
                        .and_then(|value| value.parse::<u32>().ok())
                        .unwrap_or(0);
                    dit.modify_entry(&target, &[ChangeOperation::replace("description", [(current + 1).to_string()])])
                })
                .await
        }
    });
    for result in join_all(units).await {
        result.unwrap();
    }

    let entry = server.get_entry(&target).await.unwrap();
    assert_eq!(entry.values(&schema, "description").unwrap(), ["50".to_string()]);
}

#[tokio::test]
async fn test_interleaved_readers_never_see_partial_writes() {
    let server = scenario_server();
    let schema = core_schema();
    let target = dn(&schema, "cn=Test2,ou=TestOu,dc=georgiboy,dc=dev");

    // every write replaces sn and description together
    let writers = (0..20).map(|i| {
        let server = server.clone();
        let target = target.clone();
        tokio::spawn(async move {
            server
                .modify_entry(
                    &target,
                    vec![
                        ChangeOperation::replace("sn", [format!("v{i}")]),
                        ChangeOperation::replace("description", [format!("v{i}")]),
                    ],
                )
                .await
        })
    });
    let readers = (0..20).map(|_| {
        let server = server.clone();
        let target = target.clone();
        tokio::spawn(async move { server.get_entry(&target).await })
    });

    let writes: Vec<_> = writers.collect();
    let reads: Vec<_> = readers.collect();
    for read in join_all(reads).await {
        let entry = read.unwrap().unwrap();
        let sn = entry.values(&schema, "sn").map(|v| v.to_vec());
        let description = entry.values(&schema, "description").map(|v| v.to_vec());
        if let Some(description) = description {
            assert_eq!(Some(description), sn);
        } else {
            assert_eq!(sn, Some(vec!["Tester".to_string()]));
        }
    }
    for write in join_all(writes).await {
        write.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_failed_unit_does_not_disturb_the_queue() {
    let server = scenario_server();
    let schema = core_schema();
    let target = dn(&schema, "cn=Test3,ou=TestOu,dc=georgiboy,dc=dev");

    let results = join_all([
        server.modify_entry(&target, vec![ChangeOperation::add("description", ["one"])]),
        server.modify_entry(&target, vec![ChangeOperation::add("bogus", ["two"])]),
        server.modify_entry(&target, vec![ChangeOperation::add("description", ["three"])]),
    ])
    .await;
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().result_code(), ResultCode::UndefinedAttributeType);
    assert!(results[2].is_ok());

    let entry = server.get_entry(&target).await.unwrap();
    assert_eq!(entry.values(&schema, "description").unwrap().len(), 2);
}

#[tokio::test]
async fn test_shutdown_finishes_queued_work() {
    let server = scenario_server();
    let schema = core_schema();
    let target = dn(&schema, "cn=Test3,ou=TestOu,dc=georgiboy,dc=dev");

    let queued = {
        let server = server.clone();
        let target = target.clone();
        tokio::spawn(async move { server.delete_entry(&target).await })
    };
    queued.await.unwrap().unwrap();
    server.shutdown().await.unwrap();

    assert_eq!(server.state(), SchedulerState::Closed);
    let error = server
        .search(&target, SearchScope::BaseObject, Filter::everything())
        .await
        .unwrap_err();
    assert!(matches!(error, DirectoryError::Unavailable));
    assert_eq!(error.result_code(), ResultCode::Unavailable);
}

#[test]
fn test_server_runs_on_a_test_runtime() {
    tokio_test::block_on(async {
        let schema = core_schema();
        let server = DirectoryServerBuilder::new(schema.clone())
            .with_queue_capacity(1)
            .with_entries(scenario_entries(&schema))
            .build()
            .unwrap();
        let outcome = server
            .execute(DirectoryOperation::Compare {
                dn: "cn=Test1,dc=georgiboy,dc=dev".to_string(),
                attribute: "sn".to_string(),
                value: "tester".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, OperationOutcome::Compared(true));
        server.shutdown().await.unwrap();
    });
}

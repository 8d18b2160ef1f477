//! Unit tests for the provisioning orchestrator

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use cloud_driver::{CloudError, ErrorKind, MockEks};
    use cluster_model::{Iid, NodeGroupSpec, ResourceStatus, ScalingBounds};
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_cluster_with_node_groups() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);

        let created = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1", "ng-2"]))
            .await
            .unwrap();

        let cluster = created.cluster;
        assert_eq!(cluster.iid, Iid::new("demo", "demo"));
        assert_eq!(cluster.status, ResourceStatus::Active);
        assert_eq!(cluster.version, "1.29");
        assert!(cluster.endpoint.is_some());
        assert!(created.failed_node_groups.is_empty());

        let names: Vec<_> = cluster.node_groups.iter().map(|ng| ng.iid.name_id.as_str()).collect();
        assert_eq!(names, vec!["ng-1", "ng-2"]);
        assert!(cluster.node_groups.iter().all(|ng| ng.status == ResourceStatus::Active));
        assert!(cluster.node_groups.iter().all(|ng| ng.belongs_to(&cluster.iid)));
    }

    #[tokio::test]
    async fn test_failed_node_group_does_not_stop_the_rest() {
        let mock = test_mock();
        mock.fail_nodegroup_create("ng-2", "ResourceLimitExceededException");
        let orchestrator = orchestrator(&mock);

        let created = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1", "ng-2", "ng-3"]))
            .await
            .unwrap();

        let names: Vec<_> = created.cluster.node_groups.iter().map(|ng| ng.iid.name_id.as_str()).collect();
        assert_eq!(names, vec!["ng-1", "ng-3"]);

        assert_eq!(created.failed_node_groups.len(), 1);
        let failure = &created.failed_node_groups[0];
        assert_eq!(failure.name_id, "ng-2");
        assert_eq!(failure.error.kind(), ErrorKind::ResourceLimitExceeded);
    }

    #[tokio::test]
    async fn test_invalid_node_group_bounds_make_no_provider_call() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);

        for (desired, min, max) in [(0, 1, 3), (4, 1, 3), (0, 0, 0), (2, 3, 1)] {
            let err = orchestrator
                .add_node_group(&Iid::from_name("demo"), &NodeGroupSpec::new("ng", desired, min, max))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRequest, "{desired}/{min}/{max}");
        }

        let mut spec = cluster_spec("demo", &["ok", "bad"]);
        spec.node_groups[1].desired_node_size = 9;
        let err = orchestrator.create_cluster(&spec).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let err = orchestrator
            .change_node_group_scaling(&Iid::from_name("demo"), &Iid::from_name("ok"), ScalingBounds::new(5, 1, 3))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_role_aborts_before_create() {
        let mock = MockEks::new();
        let orchestrator = orchestrator(&mock);

        let err = orchestrator.create_cluster(&cluster_spec("demo", &[])).await.unwrap_err();

        assert!(matches!(err, CloudError::RoleNotFound(_)));
        assert_eq!(mock.calls(), 1);
        assert!(mock.peek_cluster("demo").is_none());
    }

    #[tokio::test]
    async fn test_missing_node_group_role_aborts_before_create() {
        let mock = MockEks::new();
        mock.add_role("cloud-barista-spider-eks-cluster-role");
        let orchestrator = orchestrator(&mock);

        let err = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1"]))
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::RoleNotFound(_)));
        assert!(mock.peek_cluster("demo").is_none());
    }

    #[tokio::test]
    async fn test_delete_cluster_confirmed() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &[])).await.unwrap().cluster;

        assert!(orchestrator.delete_cluster(&cluster.iid).await.unwrap());

        let err = orchestrator.get_cluster(&cluster.iid).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_cluster_with_node_groups_is_rejected() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &["ng-1"])).await.unwrap().cluster;

        let err = orchestrator.delete_cluster(&cluster.iid).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceInUse);

        let cluster = orchestrator.get_cluster(&cluster.iid).await.unwrap();
        assert_eq!(cluster.status, ResourceStatus::Active);
    }

    #[tokio::test]
    async fn test_rejected_delete_is_an_error() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &[])).await.unwrap().cluster;
        mock.reject_deletes("AccessDeniedException");

        let err = orchestrator.delete_cluster(&cluster.iid).await.unwrap_err();
        assert!(matches!(err, CloudError::Unknown { ref code, .. } if code == "AccessDeniedException"));
    }

    #[tokio::test]
    async fn test_remove_node_group_then_delete_cluster() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &["ng-1"])).await.unwrap().cluster;
        let node_group = cluster.node_groups[0].iid.clone();

        assert!(orchestrator.remove_node_group(&cluster.iid, &node_group).await.unwrap());
        assert!(orchestrator.list_node_groups(&cluster.iid).await.unwrap().is_empty());
        assert!(orchestrator.delete_cluster(&cluster.iid).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_skips_clusters_that_fail_to_describe() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        for name in ["alpha", "bravo", "charlie"] {
            orchestrator.create_cluster(&cluster_spec(name, &[])).await.unwrap();
        }
        mock.hide_cluster("bravo");

        let clusters = orchestrator.list_clusters().await.unwrap();

        let names: Vec<_> = clusters.iter().map(|c| c.iid.name_id.as_str()).collect();
        assert_eq!(names, vec!["alpha", "charlie"]);
    }

    #[tokio::test]
    async fn test_name_id_defaults_without_tag_support() {
        let mock = test_mock().without_tags();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &[])).await.unwrap().cluster;

        let added = orchestrator
            .add_node_group(&cluster.iid, &NodeGroupSpec::new("test-ng", 1, 1, 2))
            .await
            .unwrap();
        assert_eq!(added.iid.name_id, "test-ng");
        assert!(!added.iid.system_id.is_empty());

        let again = orchestrator.get_node_group(&cluster.iid, &added.iid).await.unwrap();
        assert!(!again.iid.name_id.is_empty());
        assert_eq!(again.iid.system_id, added.iid.system_id);
    }

    #[tokio::test]
    async fn test_get_cluster_is_idempotent() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1", "ng-2"]))
            .await
            .unwrap()
            .cluster;

        let first = orchestrator.get_cluster(&cluster.iid).await.unwrap();
        let second = orchestrator.get_cluster(&cluster.iid).await.unwrap();

        assert_eq!(first.status, second.status);
        assert_eq!(first.node_groups, second.node_groups);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_create_times_out_before_stabilization() {
        let mock = MockEks::with_default_roles().with_stabilization(1_000_000);
        let mut config = test_config();
        config.create = fast_poll(Duration::from_millis(50));
        let orchestrator = orchestrator_with(&mock, config);

        let err = orchestrator.create_cluster(&cluster_spec("demo", &[])).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_create_without_waiting_returns_creating_snapshot() {
        let mock = test_mock();
        let mut config = test_config();
        config.wait_for_cluster = false;
        config.wait_for_node_groups = false;
        let orchestrator = orchestrator_with(&mock, config);

        let created = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1"]))
            .await
            .unwrap();

        assert_eq!(created.cluster.status, ResourceStatus::Creating);
        assert_eq!(created.cluster.node_groups.len(), 1);
        assert_eq!(created.cluster.node_groups[0].status, ResourceStatus::Creating);
    }

    #[tokio::test]
    async fn test_scaling_applied_to_every_scaling_group() {
        let mock = test_mock().with_asgs_per_nodegroup(2);
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &["ng-1"])).await.unwrap().cluster;
        let node_group = &cluster.node_groups[0];
        assert_eq!(node_group.scaling_group_ids.len(), 2);

        let scaled = orchestrator
            .change_node_group_scaling(&cluster.iid, &node_group.iid, ScalingBounds::new(3, 2, 5))
            .await
            .unwrap();

        assert_eq!(scaled.bounds(), ScalingBounds::new(3, 2, 5));
        let updates = mock.scaling_updates();
        assert_eq!(updates.len(), 2);
        for (update, scaling_group) in updates.iter().zip(&node_group.scaling_group_ids) {
            assert_eq!(&update.auto_scaling_group_name, scaling_group);
            assert_eq!((update.desired_capacity, update.min_size, update.max_size), (3, 2, 5));
        }
    }

    #[tokio::test]
    async fn test_scaling_without_scaling_group_is_not_found() {
        let mock = test_mock().with_asgs_per_nodegroup(0);
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &["ng-1"])).await.unwrap().cluster;

        let err = orchestrator
            .change_node_group_scaling(&cluster.iid, &cluster.node_groups[0].iid, ScalingBounds::new(1, 1, 1))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(mock.scaling_updates().is_empty());
    }

    #[tokio::test]
    async fn test_upgrade_does_not_wait_for_completion() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &[])).await.unwrap().cluster;
        let before = mock.calls();

        let upgraded = orchestrator.upgrade_cluster(&cluster.iid, "1.30").await.unwrap();

        assert_eq!(upgraded.status, ResourceStatus::Updating);
        assert_eq!(upgraded.version, "1.30");
        // UpdateClusterVersion, DescribeCluster, ListNodegroups
        assert_eq!(mock.calls() - before, 3);
    }

    #[tokio::test]
    async fn test_orphaned_node_group_is_reported() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1", "ng-2"]))
            .await
            .unwrap()
            .cluster;
        mock.reparent_nodegroup("demo", "ng-2", "elsewhere");

        let cluster = orchestrator.get_cluster(&cluster.iid).await.unwrap();

        assert_eq!(cluster.node_groups.len(), 1);
        assert_eq!(cluster.orphaned_node_groups.len(), 1);
        assert_eq!(cluster.orphaned_node_groups[0].iid.name_id, "ng-2");
        assert_eq!(cluster.orphaned_node_groups[0].cluster.system_id, "elsewhere");
    }

    #[tokio::test]
    async fn test_node_group_that_fails_to_describe_is_skipped() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1", "ng-2"]))
            .await
            .unwrap()
            .cluster;
        mock.hide_nodegroup("demo", "ng-1");

        let node_groups = orchestrator.list_node_groups(&cluster.iid).await.unwrap();

        assert_eq!(node_groups.len(), 1);
        assert_eq!(node_groups[0].iid.name_id, "ng-2");
    }

    #[tokio::test]
    async fn test_unhealthy_instances_become_member_nodes() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &["ng-1"])).await.unwrap().cluster;
        mock.report_unhealthy_nodes("demo", "ng-1", &["i-0a", "i-0b"]);

        let node_group = orchestrator
            .get_node_group(&cluster.iid, &cluster.node_groups[0].iid)
            .await
            .unwrap();

        assert_eq!(node_group.status, ResourceStatus::Active);
        assert_eq!(node_group.nodes, vec![Iid::from_system_id("i-0a"), Iid::from_system_id("i-0b")]);
    }

    #[tokio::test]
    async fn test_independent_creates_run_concurrently() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);

        let tasks: Vec<_> = ["east", "west", "north"]
            .into_iter()
            .map(|name| {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move { orchestrator.create_cluster(&cluster_spec(name, &["ng-1"])).await })
            })
            .collect();

        for task in tasks {
            let created = task.await.unwrap().unwrap();
            assert_eq!(created.cluster.status, ResourceStatus::Active);
            assert_eq!(created.cluster.node_groups.len(), 1);
        }
        assert_eq!(orchestrator.list_clusters().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_node_group_settling_in_error_is_recorded() {
        let mock = test_mock();
        mock.fail_nodegroup_settle("ng-2");
        let orchestrator = orchestrator(&mock);

        let created = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1", "ng-2", "ng-3"]))
            .await
            .unwrap();

        assert_eq!(created.cluster.status, ResourceStatus::Active);
        assert_eq!(created.failed_node_groups.len(), 1);
        let failure = &created.failed_node_groups[0];
        assert_eq!(failure.name_id, "ng-2");
        assert!(matches!(failure.error, CloudError::Unknown { ref code, .. } if code == "ResourceFailed"));

        let status_of = |name: &str| {
            created
                .cluster
                .node_groups
                .iter()
                .find(|ng| ng.iid.name_id == name)
                .map(|ng| ng.status)
        };
        assert_eq!(status_of("ng-1"), Some(ResourceStatus::Active));
        assert_eq!(status_of("ng-2"), Some(ResourceStatus::Error));
        assert_eq!(status_of("ng-3"), Some(ResourceStatus::Active));
    }

    #[tokio::test]
    async fn test_node_group_wait_timeout_does_not_fail_cluster() {
        let mock = test_mock();
        mock.stall_nodegroup("ng-1");
        let mut config = test_config();
        config.create = fast_poll(Duration::from_millis(200));
        let orchestrator = orchestrator_with(&mock, config);

        let created = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1", "ng-2"]))
            .await
            .unwrap();

        assert_eq!(created.cluster.status, ResourceStatus::Active);
        assert_eq!(created.failed_node_groups.len(), 1);
        assert_eq!(created.failed_node_groups[0].name_id, "ng-1");
        assert_eq!(created.failed_node_groups[0].error.kind(), ErrorKind::Timeout);

        let ng_2 = created.cluster.node_groups.iter().find(|ng| ng.iid.name_id == "ng-2").unwrap();
        assert_eq!(ng_2.status, ResourceStatus::Active);
    }

    #[tokio::test]
    async fn test_delete_settling_in_error_is_an_error() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let cluster = orchestrator.create_cluster(&cluster_spec("demo", &[])).await.unwrap().cluster;
        mock.fail_cluster_delete_settle("demo");

        let result = orchestrator.delete_cluster(&cluster.iid).await;

        assert!(matches!(result, Err(CloudError::Unknown { ref code, .. }) if code == "ResourceFailed"));
        let cluster = orchestrator.get_cluster(&cluster.iid).await.unwrap();
        assert_eq!(cluster.status, ResourceStatus::Error);
    }

    #[tokio::test]
    async fn test_names_that_are_not_native_names_are_rejected_up_front() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);

        let err = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng.1", "ng 1"]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let err = orchestrator.create_cluster(&cluster_spec("my demo", &[])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let err = orchestrator
            .add_node_group(&Iid::from_name("demo"), &NodeGroupSpec::new("ng 1", 1, 1, 2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_similar_names_address_distinct_node_groups() {
        let mock = test_mock();
        let orchestrator = orchestrator(&mock);
        let created = orchestrator
            .create_cluster(&cluster_spec("demo", &["ng-1", "ng_1"]))
            .await
            .unwrap();
        assert!(created.failed_node_groups.is_empty());
        assert_eq!(created.cluster.node_groups.len(), 2);

        let cluster = Iid::from_name("demo");
        let underscore = orchestrator.get_node_group(&cluster, &Iid::from_name("ng_1")).await.unwrap();
        assert_eq!(underscore.iid, Iid::new("ng_1", "ng_1"));
        let dash = orchestrator.get_node_group(&cluster, &Iid::from_name("ng-1")).await.unwrap();
        assert_eq!(dash.iid, Iid::new("ng-1", "ng-1"));

        let err = orchestrator
            .get_node_group(&cluster, &Iid::from_name("ng 1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_creation_report_serializes_errors_as_text() {
        let failure = crate::NodeGroupFailure {
            name_id: "ng-2".to_string(),
            error: CloudError::ResourceLimitExceeded("quota".to_string()),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["nameId"], "ng-2");
        assert_eq!(json["error"], "Resource limit exceeded: quota");
    }
}

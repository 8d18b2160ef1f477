//! In-memory EKS simulator for unit testing
//!
//! [`MockEks`] implements [`EksApi`] over a store owned by each instance, so
//! the real [`AwsAdapter`](crate::AwsAdapter) translation runs in tests
//! without a live endpoint. Clones share the same store.
//!
//! The mock is organized into domain-specific modules:
//! - `cluster.rs` - cluster lifecycle
//! - `nodegroup.rs` - node-group lifecycle
//! - `iam.rs` - IAM roles and Auto Scaling groups
//!
//! Lifecycle transitions advance on describe: a resource created or updated
//! stays `CREATING` / `UPDATING` for `stabilization` describes, and a deleted
//! one stays `DELETING` for `deletion` describes before it disappears.

mod cluster;
mod iam;
mod nodegroup;

use crate::aws::api::EksApi;
use crate::aws::errors::AWS_DIALECT;
use crate::aws::models::*;
use crate::error::CloudError;
use crate::normalize::NativeError;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub(crate) const ACCOUNT_ID: &str = "123456789012";

/// A stored resource with the describes left before its next transition
#[derive(Debug, Clone)]
pub(crate) struct Tracked<T> {
    pub(crate) resource: T,
    pub(crate) remaining: u32,
}

/// Fault injection switches
#[derive(Debug, Default)]
pub(crate) struct Faults {
    /// Native node-group name -> native error code returned on create
    pub(crate) nodegroup_create: HashMap<String, String>,
    /// Clusters that are listed but fail to describe
    pub(crate) hidden_clusters: HashSet<String>,
    /// `(cluster, nodegroup)` pairs that are listed but fail to describe
    pub(crate) hidden_nodegroups: HashSet<(String, String)>,
    /// Native error code returned by every delete
    pub(crate) delete: Option<String>,
    /// Node groups that settle in `CREATE_FAILED` instead of `ACTIVE`
    pub(crate) nodegroup_settle: HashSet<String>,
    /// Node groups that never leave `CREATING`
    pub(crate) stalled_nodegroups: HashSet<String>,
    /// Clusters that settle in `DELETE_FAILED` instead of disappearing
    pub(crate) cluster_delete_settle: HashSet<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) region: String,
    pub(crate) stabilization: u32,
    pub(crate) deletion: u32,
    pub(crate) drop_tags: bool,
    pub(crate) asgs_per_nodegroup: usize,
    pub(crate) page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            stabilization: 0,
            deletion: 0,
            drop_tags: false,
            asgs_per_nodegroup: 1,
            page_size: 100,
        }
    }
}

/// In-memory EKS for testing
#[derive(Debug, Clone, Default)]
pub struct MockEks {
    pub(crate) settings: Settings,
    pub(crate) clusters: Arc<Mutex<BTreeMap<String, Tracked<Cluster>>>>,
    pub(crate) nodegroups: Arc<Mutex<BTreeMap<(String, String), Tracked<Nodegroup>>>>,
    pub(crate) roles: Arc<Mutex<HashMap<String, Role>>>,
    pub(crate) scaling_updates: Arc<Mutex<Vec<UpdateAutoScalingGroupRequest>>>,
    pub(crate) faults: Arc<Mutex<Faults>>,
    calls: Arc<AtomicUsize>,
}

impl MockEks {
    /// Empty simulator with no IAM roles
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulator with the default cluster and node-group roles already present
    pub fn with_default_roles() -> Self {
        let mock = Self::new();
        let roles = crate::aws::RoleConvention::default();
        mock.add_role(&roles.cluster_role);
        mock.add_role(&roles.node_group_role);
        mock
    }

    /// Describes a resource stays `CREATING` / `UPDATING` before it settles
    #[must_use]
    pub fn with_stabilization(mut self, describes: u32) -> Self {
        self.settings.stabilization = describes;
        self
    }

    /// Describes a resource stays `DELETING` before it is gone
    #[must_use]
    pub fn with_deletion(mut self, describes: u32) -> Self {
        self.settings.deletion = describes;
        self
    }

    /// Behave like a platform without tag support
    #[must_use]
    pub fn without_tags(mut self) -> Self {
        self.settings.drop_tags = true;
        self
    }

    /// Auto Scaling groups backing each node group
    #[must_use]
    pub fn with_asgs_per_nodegroup(mut self, count: usize) -> Self {
        self.settings.asgs_per_nodegroup = count;
        self
    }

    /// Names returned per list page
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.settings.page_size = size.max(1);
        self
    }

    pub fn add_role(&self, name: &str) {
        iam::add_role(self, name);
    }

    /// Fail CreateNodegroup for `nodegroup` with the native error `code`
    pub fn fail_nodegroup_create(&self, nodegroup: &str, code: &str) {
        lock(&self.faults)
            .nodegroup_create
            .insert(nodegroup.to_string(), code.to_string());
    }

    /// Keep `cluster` in list results but fail its describe with NotFound
    pub fn hide_cluster(&self, cluster: &str) {
        lock(&self.faults).hidden_clusters.insert(cluster.to_string());
    }

    /// Keep `nodegroup` in list results but fail its describe with NotFound
    pub fn hide_nodegroup(&self, cluster: &str, nodegroup: &str) {
        lock(&self.faults)
            .hidden_nodegroups
            .insert((cluster.to_string(), nodegroup.to_string()));
    }

    /// Reject every delete with the native error `code`
    pub fn reject_deletes(&self, code: &str) {
        lock(&self.faults).delete = Some(code.to_string());
    }

    /// Accept CreateNodegroup for `nodegroup` but settle it in `CREATE_FAILED`
    pub fn fail_nodegroup_settle(&self, nodegroup: &str) {
        lock(&self.faults).nodegroup_settle.insert(nodegroup.to_string());
    }

    /// Accept CreateNodegroup for `nodegroup` but keep it `CREATING` forever
    pub fn stall_nodegroup(&self, nodegroup: &str) {
        lock(&self.faults).stalled_nodegroups.insert(nodegroup.to_string());
    }

    /// Accept DeleteCluster for `cluster` but settle it in `DELETE_FAILED`
    pub fn fail_cluster_delete_settle(&self, cluster: &str) {
        lock(&self.faults).cluster_delete_settle.insert(cluster.to_string());
    }

    /// Make `nodegroup`, listed under `cluster`, report `parent` as its cluster
    pub fn reparent_nodegroup(&self, cluster: &str, nodegroup: &str, parent: &str) {
        nodegroup::reparent(self, cluster, nodegroup, parent);
    }

    /// Report `instance_ids` as unhealthy members of `nodegroup`
    pub fn report_unhealthy_nodes(&self, cluster: &str, nodegroup: &str, instance_ids: &[&str]) {
        nodegroup::report_unhealthy(self, cluster, nodegroup, instance_ids);
    }

    /// Number of native calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Auto Scaling updates received, in order
    pub fn scaling_updates(&self) -> Vec<UpdateAutoScalingGroupRequest> {
        lock(&self.scaling_updates).clone()
    }

    /// Raw stored cluster, without advancing its lifecycle
    pub fn peek_cluster(&self, name: &str) -> Option<Cluster> {
        lock(&self.clusters).get(name).map(|t| t.resource.clone())
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Lock a store, recovering the data if a panicking test poisoned it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Raise a native AWS error through the same normalization as the HTTP client
pub(crate) fn native_error(code: &str, message: impl Into<String>) -> CloudError {
    AWS_DIALECT.normalize(NativeError::new(code, message))
}

/// Slice `names` into a page starting at the numeric `next_token`
pub(crate) fn paginate(names: Vec<String>, next_token: Option<&str>, page_size: usize) -> (Vec<String>, Option<String>) {
    let start = next_token.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
    let end = (start + page_size).min(names.len());
    let page = names.get(start..end).map(<[String]>::to_vec).unwrap_or_default();
    let next = (end < names.len()).then(|| end.to_string());
    (page, next)
}

pub(crate) fn now_epoch() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

#[async_trait::async_trait]
impl EksApi for MockEks {
    async fn create_cluster(&self, request: &CreateClusterRequest) -> Result<Cluster, CloudError> {
        self.record_call();
        cluster::create(self, request)
    }

    async fn describe_cluster(&self, name: &str) -> Result<Cluster, CloudError> {
        self.record_call();
        cluster::describe(self, name)
    }

    async fn list_clusters(&self, next_token: Option<&str>) -> Result<ListClustersResponse, CloudError> {
        self.record_call();
        Ok(cluster::list(self, next_token))
    }

    async fn delete_cluster(&self, name: &str) -> Result<Cluster, CloudError> {
        self.record_call();
        cluster::delete(self, name)
    }

    async fn update_cluster_version(&self, name: &str, version: &str) -> Result<Update, CloudError> {
        self.record_call();
        cluster::update_version(self, name, version)
    }

    async fn create_nodegroup(
        &self,
        cluster: &str,
        request: &CreateNodegroupRequest,
    ) -> Result<Nodegroup, CloudError> {
        self.record_call();
        nodegroup::create(self, cluster, request)
    }

    async fn describe_nodegroup(&self, cluster: &str, nodegroup: &str) -> Result<Nodegroup, CloudError> {
        self.record_call();
        nodegroup::describe(self, cluster, nodegroup)
    }

    async fn list_nodegroups(
        &self,
        cluster: &str,
        next_token: Option<&str>,
    ) -> Result<ListNodegroupsResponse, CloudError> {
        self.record_call();
        nodegroup::list(self, cluster, next_token)
    }

    async fn delete_nodegroup(&self, cluster: &str, nodegroup: &str) -> Result<Nodegroup, CloudError> {
        self.record_call();
        nodegroup::delete(self, cluster, nodegroup)
    }

    async fn get_role(&self, name: &str) -> Result<Role, CloudError> {
        self.record_call();
        iam::get_role(self, name)
    }

    async fn update_auto_scaling_group(&self, request: &UpdateAutoScalingGroupRequest) -> Result<(), CloudError> {
        self.record_call();
        iam::update_auto_scaling_group(self, request)
    }
}

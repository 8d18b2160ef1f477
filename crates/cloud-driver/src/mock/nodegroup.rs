//! Node-group operations for MockEks

use super::{ACCOUNT_ID, MockEks, Tracked, lock, native_error, now_epoch, paginate};
use crate::aws::models::*;
use crate::error::CloudError;

type Key = (String, String);

fn key(cluster: &str, nodegroup: &str) -> Key {
    (cluster.to_string(), nodegroup.to_string())
}

fn not_found(cluster: &str, nodegroup: &str) -> CloudError {
    native_error(
        "ResourceNotFoundException",
        format!("No node group found for name: {nodegroup} in cluster {cluster}."),
    )
}

fn cluster_not_found(cluster: &str) -> CloudError {
    native_error("ResourceNotFoundException", format!("No cluster found for name: {cluster}."))
}

pub(crate) fn create(
    mock: &MockEks,
    cluster: &str,
    request: &CreateNodegroupRequest,
) -> Result<Nodegroup, CloudError> {
    let version = {
        let clusters = lock(&mock.clusters);
        let parent = clusters.get(cluster).ok_or_else(|| cluster_not_found(cluster))?;
        parent.resource.version.clone()
    };

    if let Some(code) = lock(&mock.faults).nodegroup_create.get(&request.nodegroup_name) {
        return Err(native_error(
            code,
            format!("CreateNodegroup {} failed", request.nodegroup_name),
        ));
    }

    let scaling = request.scaling_config;
    if scaling.max_size.unwrap_or_default() < 1 {
        return Err(native_error("InvalidParameterException", "maxSize must be greater than or equal to 1"));
    }

    let mut nodegroups = lock(&mock.nodegroups);
    let id = key(cluster, &request.nodegroup_name);
    if nodegroups.contains_key(&id) {
        return Err(native_error(
            "ResourceInUseException",
            format!("NodeGroup already exists with name {} and cluster name {cluster}", request.nodegroup_name),
        ));
    }

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let auto_scaling_groups = (0..mock.settings.asgs_per_nodegroup)
        .map(|i| AutoScalingGroup {
            name: format!("eks-{}-{}-{i}", request.nodegroup_name, &suffix[..8]),
        })
        .collect();

    let region = &mock.settings.region;
    let nodegroup = Nodegroup {
        nodegroup_name: request.nodegroup_name.clone(),
        nodegroup_arn: Some(format!(
            "arn:aws:eks:{region}:{ACCOUNT_ID}:nodegroup/{cluster}/{}/{}",
            request.nodegroup_name,
            &suffix[..8]
        )),
        cluster_name: cluster.to_string(),
        version,
        release_version: None,
        created_at: Some(now_epoch()),
        status: Some("CREATING".to_string()),
        capacity_type: Some("ON_DEMAND".to_string()),
        scaling_config: Some(scaling),
        instance_types: Some(
            request
                .instance_types
                .clone()
                .unwrap_or_else(|| vec!["t3.medium".to_string()]),
        ),
        subnets: request.subnets.clone(),
        remote_access: request.remote_access.clone(),
        ami_type: Some("AL2_x86_64".to_string()),
        node_role: Some(request.node_role.clone()),
        resources: Some(NodegroupResources {
            auto_scaling_groups,
            remote_access_security_group: None,
        }),
        disk_size: Some(request.disk_size.unwrap_or(20)),
        health: Some(NodegroupHealth::default()),
        tags: (!mock.settings.drop_tags).then(|| request.tags.clone()),
    };

    nodegroups.insert(
        id,
        Tracked {
            resource: nodegroup.clone(),
            remaining: mock.settings.stabilization,
        },
    );
    Ok(nodegroup)
}

pub(crate) fn describe(mock: &MockEks, cluster: &str, nodegroup: &str) -> Result<Nodegroup, CloudError> {
    let id = key(cluster, nodegroup);
    let (settles_failed, stalled) = {
        let faults = lock(&mock.faults);
        if faults.hidden_nodegroups.contains(&id) {
            return Err(not_found(cluster, nodegroup));
        }
        (
            faults.nodegroup_settle.contains(nodegroup),
            faults.stalled_nodegroups.contains(nodegroup),
        )
    };

    let mut nodegroups = lock(&mock.nodegroups);
    let entry = nodegroups.get_mut(&id).ok_or_else(|| not_found(cluster, nodegroup))?;
    let status = entry.resource.status.clone().unwrap_or_default();

    match status.as_str() {
        "CREATING" if stalled => {}
        "CREATING" if entry.remaining == 0 && settles_failed => {
            entry.resource.status = Some("CREATE_FAILED".to_string());
        }
        "CREATING" | "UPDATING" if entry.remaining == 0 => {
            entry.resource.status = Some("ACTIVE".to_string());
        }
        "DELETING" if entry.remaining == 0 => {
            nodegroups.remove(&id);
            return Err(not_found(cluster, nodegroup));
        }
        "CREATING" | "UPDATING" | "DELETING" => entry.remaining -= 1,
        _ => {}
    }
    Ok(entry.resource.clone())
}

pub(crate) fn list(
    mock: &MockEks,
    cluster: &str,
    next_token: Option<&str>,
) -> Result<ListNodegroupsResponse, CloudError> {
    if !lock(&mock.clusters).contains_key(cluster) {
        return Err(cluster_not_found(cluster));
    }

    let names: Vec<String> = lock(&mock.nodegroups)
        .keys()
        .filter(|(parent, _)| parent == cluster)
        .map(|(_, name)| name.clone())
        .collect();
    let (nodegroups, next_token) = paginate(names, next_token, mock.settings.page_size);
    Ok(ListNodegroupsResponse { nodegroups, next_token })
}

pub(crate) fn delete(mock: &MockEks, cluster: &str, nodegroup: &str) -> Result<Nodegroup, CloudError> {
    if let Some(code) = lock(&mock.faults).delete.clone() {
        return Err(native_error(&code, format!("Delete of node group {nodegroup} rejected")));
    }

    let mut nodegroups = lock(&mock.nodegroups);
    let entry = nodegroups
        .get_mut(&key(cluster, nodegroup))
        .ok_or_else(|| not_found(cluster, nodegroup))?;
    if entry.resource.status.as_deref() != Some("DELETING") {
        entry.resource.status = Some("DELETING".to_string());
        entry.remaining = mock.settings.deletion;
    }
    Ok(entry.resource.clone())
}

pub(crate) fn reparent(mock: &MockEks, cluster: &str, nodegroup: &str, parent: &str) {
    if let Some(entry) = lock(&mock.nodegroups).get_mut(&key(cluster, nodegroup)) {
        entry.resource.cluster_name = parent.to_string();
    }
}

pub(crate) fn report_unhealthy(mock: &MockEks, cluster: &str, nodegroup: &str, instance_ids: &[&str]) {
    if let Some(entry) = lock(&mock.nodegroups).get_mut(&key(cluster, nodegroup)) {
        let issue = Issue {
            code: Some("NodeCreationFailure".to_string()),
            message: Some("Unhealthy nodes in the kubernetes cluster".to_string()),
            resource_ids: instance_ids.iter().map(|id| (*id).to_string()).collect(),
        };
        entry.resource.health.get_or_insert_with(NodegroupHealth::default).issues.push(issue);
        entry.resource.status = Some("DEGRADED".to_string());
    }
}

//! Cluster operations for MockEks

use super::{ACCOUNT_ID, MockEks, Tracked, lock, native_error, now_epoch, paginate};
use crate::aws::models::*;
use crate::error::CloudError;

fn not_found(name: &str) -> CloudError {
    native_error("ResourceNotFoundException", format!("No cluster found for name: {name}."))
}

pub(crate) fn create(mock: &MockEks, request: &CreateClusterRequest) -> Result<Cluster, CloudError> {
    if request.resources_vpc_config.subnet_ids.len() < 2 {
        return Err(native_error(
            "InvalidParameterException",
            "Subnets specified must be in at least two different AZs",
        ));
    }

    let mut clusters = lock(&mock.clusters);
    if clusters.contains_key(&request.name) {
        return Err(native_error(
            "ResourceInUseException",
            format!("Cluster already exists with name: {}", request.name),
        ));
    }

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let region = &mock.settings.region;
    let cluster = Cluster {
        name: request.name.clone(),
        arn: Some(format!("arn:aws:eks:{region}:{ACCOUNT_ID}:cluster/{}", request.name)),
        created_at: Some(now_epoch()),
        version: Some(request.version.clone().unwrap_or_else(|| "1.29".to_string())),
        endpoint: Some(format!("https://{}.gr7.{region}.eks.amazonaws.com", &suffix[..16])),
        role_arn: Some(request.role_arn.clone()),
        resources_vpc_config: Some(VpcConfigResponse {
            subnet_ids: request.resources_vpc_config.subnet_ids.clone(),
            security_group_ids: request.resources_vpc_config.security_group_ids.clone(),
            cluster_security_group_id: Some(format!("sg-{}", &suffix[16..])),
            vpc_id: Some("vpc-0a1b2c3d".to_string()),
        }),
        status: Some("CREATING".to_string()),
        platform_version: Some("eks.1".to_string()),
        tags: (!mock.settings.drop_tags).then(|| request.tags.clone()),
    };

    clusters.insert(
        request.name.clone(),
        Tracked {
            resource: cluster.clone(),
            remaining: mock.settings.stabilization,
        },
    );
    Ok(cluster)
}

pub(crate) fn describe(mock: &MockEks, name: &str) -> Result<Cluster, CloudError> {
    let delete_fails = {
        let faults = lock(&mock.faults);
        if faults.hidden_clusters.contains(name) {
            return Err(not_found(name));
        }
        faults.cluster_delete_settle.contains(name)
    };

    let mut clusters = lock(&mock.clusters);
    let entry = clusters.get_mut(name).ok_or_else(|| not_found(name))?;
    let status = entry.resource.status.clone().unwrap_or_default();

    match status.as_str() {
        "CREATING" | "UPDATING" if entry.remaining == 0 => {
            entry.resource.status = Some("ACTIVE".to_string());
        }
        "DELETING" if entry.remaining == 0 && delete_fails => {
            entry.resource.status = Some("DELETE_FAILED".to_string());
        }
        "DELETING" if entry.remaining == 0 => {
            clusters.remove(name);
            return Err(not_found(name));
        }
        "CREATING" | "UPDATING" | "DELETING" => entry.remaining -= 1,
        _ => {}
    }
    Ok(entry.resource.clone())
}

pub(crate) fn list(mock: &MockEks, next_token: Option<&str>) -> ListClustersResponse {
    let names: Vec<String> = lock(&mock.clusters).keys().cloned().collect();
    let (clusters, next_token) = paginate(names, next_token, mock.settings.page_size);
    ListClustersResponse { clusters, next_token }
}

pub(crate) fn delete(mock: &MockEks, name: &str) -> Result<Cluster, CloudError> {
    if let Some(code) = lock(&mock.faults).delete.clone() {
        return Err(native_error(&code, format!("Delete of cluster {name} rejected")));
    }

    let attached = lock(&mock.nodegroups).keys().filter(|(cluster, _)| cluster == name).count();
    if attached > 0 {
        return Err(native_error(
            "ResourceInUseException",
            format!("Cluster has nodegroups attached ({attached})"),
        ));
    }

    let mut clusters = lock(&mock.clusters);
    let entry = clusters.get_mut(name).ok_or_else(|| not_found(name))?;
    if entry.resource.status.as_deref() != Some("DELETING") {
        entry.resource.status = Some("DELETING".to_string());
        entry.remaining = mock.settings.deletion;
    }
    Ok(entry.resource.clone())
}

pub(crate) fn update_version(mock: &MockEks, name: &str, version: &str) -> Result<Update, CloudError> {
    let mut clusters = lock(&mock.clusters);
    let entry = clusters.get_mut(name).ok_or_else(|| not_found(name))?;

    if entry.resource.status.as_deref() != Some("ACTIVE") {
        return Err(native_error(
            "ResourceInUseException",
            format!("Cluster {name} is not ACTIVE"),
        ));
    }
    if entry.resource.version.as_deref() == Some(version) {
        return Err(native_error(
            "InvalidParameterException",
            format!("Unsupported Kubernetes minor version update from {version} to {version}"),
        ));
    }

    entry.resource.version = Some(version.to_string());
    entry.resource.status = Some("UPDATING".to_string());
    entry.remaining = mock.settings.stabilization;

    Ok(Update {
        id: uuid::Uuid::new_v4().to_string(),
        status: Some("InProgress".to_string()),
        update_type: Some("VersionUpdate".to_string()),
    })
}

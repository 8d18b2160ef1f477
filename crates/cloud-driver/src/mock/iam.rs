//! IAM and Auto Scaling operations for MockEks

use super::{ACCOUNT_ID, MockEks, lock, native_error};
use crate::aws::models::*;
use crate::error::CloudError;

pub(crate) fn add_role(mock: &MockEks, name: &str) {
    let role = Role {
        role_name: name.to_string(),
        arn: format!("arn:aws:iam::{ACCOUNT_ID}:role/{name}"),
        role_id: Some(format!("AROA{}", uuid::Uuid::new_v4().simple()).to_uppercase()),
    };
    lock(&mock.roles).insert(name.to_string(), role);
}

pub(crate) fn get_role(mock: &MockEks, name: &str) -> Result<Role, CloudError> {
    lock(&mock.roles).get(name).cloned().ok_or_else(|| {
        native_error(
            "NoSuchEntity",
            format!("The role with name {name} cannot be found."),
        )
    })
}

pub(crate) fn update_auto_scaling_group(
    mock: &MockEks,
    request: &UpdateAutoScalingGroupRequest,
) -> Result<(), CloudError> {
    let mut nodegroups = lock(&mock.nodegroups);
    let owner = nodegroups.values_mut().find(|entry| {
        entry
            .resource
            .resources
            .as_ref()
            .is_some_and(|r| r.auto_scaling_groups.iter().any(|asg| asg.name == request.auto_scaling_group_name))
    });

    let Some(owner) = owner else {
        return Err(native_error(
            "ValidationError",
            format!("AutoScalingGroup name not found - {}", request.auto_scaling_group_name),
        ));
    };

    if request.min_size > request.max_size
        || request.desired_capacity < request.min_size
        || request.desired_capacity > request.max_size
    {
        return Err(native_error(
            "ValidationError",
            "Desired capacity must be between the specified min size and max size",
        ));
    }

    // EKS mirrors the group's bounds into the node group's scaling config
    owner.resource.scaling_config = Some(NodegroupScalingConfig {
        min_size: Some(request.min_size),
        max_size: Some(request.max_size),
        desired_size: Some(request.desired_capacity),
    });
    drop(nodegroups);

    lock(&mock.scaling_updates).push(request.clone());
    Ok(())
}

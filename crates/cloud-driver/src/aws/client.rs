//! EKS API client
//!
//! REST-JSON client for the EKS control plane plus the IAM and Auto Scaling
//! calls the adapter needs. Requests go to a pre-authenticated endpoint; the
//! bearer token is handed over by the credential resolver.

use super::api::EksApi;
use super::errors::AWS_DIALECT;
use super::models::*;
use crate::common::{HttpClient, build_query_string, segment};
use crate::error::CloudError;
use tracing::debug;

/// EKS API client
#[derive(Debug, Clone)]
pub struct EksClient {
    http: HttpClient,
    region: String,
}

impl EksClient {
    /// Create a new EKS client
    ///
    /// # Arguments
    /// * `endpoint` - API endpoint; `https://eks.{region}.amazonaws.com` when `None`
    /// * `token` - bearer token for the endpoint
    /// * `region` - AWS region (e.g., "us-east-1")
    pub fn new(endpoint: Option<String>, token: String, region: String) -> Result<Self, CloudError> {
        let endpoint = endpoint.unwrap_or_else(|| default_endpoint(&region));
        let http = HttpClient::new(endpoint, token, AWS_DIALECT)?;
        Ok(Self { http, region })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> &str {
        self.http.base_url()
    }
}

/// Regional EKS endpoint
pub fn default_endpoint(region: &str) -> String {
    format!("https://eks.{region}.amazonaws.com")
}

fn page_query(next_token: Option<&str>) -> String {
    match next_token {
        Some(token) => format!("?{}", build_query_string(&[("nextToken", token)])),
        None => String::new(),
    }
}

#[async_trait::async_trait]
impl EksApi for EksClient {
    async fn create_cluster(&self, request: &CreateClusterRequest) -> Result<Cluster, CloudError> {
        let response: ClusterResponse = self.http.post("/clusters", request).await?;
        Ok(response.cluster)
    }

    async fn describe_cluster(&self, name: &str) -> Result<Cluster, CloudError> {
        let response: ClusterResponse = self.http.get(&format!("/clusters/{}", segment(name))).await?;
        Ok(response.cluster)
    }

    async fn list_clusters(&self, next_token: Option<&str>) -> Result<ListClustersResponse, CloudError> {
        let path = format!("/clusters{}", page_query(next_token));
        let response: ListClustersResponse = self.http.get(&path).await?;
        debug!(count = response.clusters.len(), more = response.next_token.is_some(), "Listed EKS clusters");
        Ok(response)
    }

    async fn delete_cluster(&self, name: &str) -> Result<Cluster, CloudError> {
        let response: ClusterResponse = self.http.delete(&format!("/clusters/{}", segment(name))).await?;
        Ok(response.cluster)
    }

    async fn update_cluster_version(&self, name: &str, version: &str) -> Result<Update, CloudError> {
        let body = UpdateClusterVersionRequest {
            version: version.to_string(),
        };
        let response: UpdateResponse = self
            .http
            .post(&format!("/clusters/{}/updates", segment(name)), &body)
            .await?;
        Ok(response.update)
    }

    async fn create_nodegroup(
        &self,
        cluster: &str,
        request: &CreateNodegroupRequest,
    ) -> Result<Nodegroup, CloudError> {
        let path = format!("/clusters/{}/node-groups", segment(cluster));
        let response: NodegroupResponse = self.http.post(&path, request).await?;
        Ok(response.nodegroup)
    }

    async fn describe_nodegroup(&self, cluster: &str, nodegroup: &str) -> Result<Nodegroup, CloudError> {
        let path = format!("/clusters/{}/node-groups/{}", segment(cluster), segment(nodegroup));
        let response: NodegroupResponse = self.http.get(&path).await?;
        Ok(response.nodegroup)
    }

    async fn list_nodegroups(
        &self,
        cluster: &str,
        next_token: Option<&str>,
    ) -> Result<ListNodegroupsResponse, CloudError> {
        let path = format!("/clusters/{}/node-groups{}", segment(cluster), page_query(next_token));
        self.http.get(&path).await
    }

    async fn delete_nodegroup(&self, cluster: &str, nodegroup: &str) -> Result<Nodegroup, CloudError> {
        let path = format!("/clusters/{}/node-groups/{}", segment(cluster), segment(nodegroup));
        let response: NodegroupResponse = self.http.delete(&path).await?;
        Ok(response.nodegroup)
    }

    async fn get_role(&self, name: &str) -> Result<Role, CloudError> {
        let response: GetRoleResponse = self.http.get(&format!("/iam/roles/{}", segment(name))).await?;
        Ok(response.role)
    }

    async fn update_auto_scaling_group(&self, request: &UpdateAutoScalingGroupRequest) -> Result<(), CloudError> {
        let path = format!("/autoscaling/groups/{}", segment(&request.auto_scaling_group_name));
        let _: serde_json::Value = self.http.post(&path, request).await?;
        Ok(())
    }
}

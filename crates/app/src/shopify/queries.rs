//! GraphQL operations against the Shopify Admin API.
//!
//! Each operation implements `graphql_client::GraphQLQuery` with the query
//! text and the variable/response types kept in a module named after it.

use graphql_client::{GraphQLQuery, QueryBody};

// =============================================================================
// Products
// =============================================================================

pub struct GetProducts;

pub mod get_products {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "getProducts";
    pub const QUERY: &str = r"
query getProducts($first: Int!) {
  products(first: $first) {
    edges {
      node {
        id
        handle
        title
      }
    }
  }
}
";

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub products: ProductConnection,
    }

    #[derive(Debug, Deserialize)]
    pub struct ProductConnection {
        pub edges: Vec<ProductEdge>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ProductEdge {
        pub node: ProductNode,
    }

    #[derive(Debug, Deserialize)]
    pub struct ProductNode {
        pub id: String,
        pub handle: String,
        pub title: String,
    }
}

impl GraphQLQuery for GetProducts {
    type Variables = get_products::Variables;
    type ResponseData = get_products::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: get_products::QUERY,
            operation_name: get_products::OPERATION_NAME,
        }
    }
}

// =============================================================================
// Webhooks
// =============================================================================

pub struct WebhookSubscriptions;

pub mod webhook_subscriptions {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "webhookSubscriptions";
    pub const QUERY: &str = r"
query webhookSubscriptions($topics: [WebhookSubscriptionTopic!]) {
  webhookSubscriptions(first: 50, topics: $topics) {
    edges {
      node {
        id
        topic
        endpoint {
          __typename
          ... on WebhookHttpEndpoint {
            callbackUrl
          }
        }
      }
    }
  }
}
";

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub topics: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub webhook_subscriptions: SubscriptionConnection,
    }

    #[derive(Debug, Deserialize)]
    pub struct SubscriptionConnection {
        pub edges: Vec<SubscriptionEdge>,
    }

    #[derive(Debug, Deserialize)]
    pub struct SubscriptionEdge {
        pub node: Subscription,
    }

    #[derive(Debug, Deserialize)]
    pub struct Subscription {
        pub id: String,
        pub topic: String,
        pub endpoint: Endpoint,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Endpoint {
        #[serde(default)]
        pub callback_url: Option<String>,
    }
}

impl GraphQLQuery for WebhookSubscriptions {
    type Variables = webhook_subscriptions::Variables;
    type ResponseData = webhook_subscriptions::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: webhook_subscriptions::QUERY,
            operation_name: webhook_subscriptions::OPERATION_NAME,
        }
    }
}

pub struct WebhookSubscriptionCreate;

pub mod webhook_subscription_create {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "webhookSubscriptionCreate";
    pub const QUERY: &str = r"
mutation webhookSubscriptionCreate($topic: WebhookSubscriptionTopic!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionCreate(topic: $topic, webhookSubscription: $webhookSubscription) {
    webhookSubscription {
      id
    }
    userErrors {
      field
      message
    }
  }
}
";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub topic: String,
        pub webhook_subscription: WebhookSubscriptionInput,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WebhookSubscriptionInput {
        pub callback_url: String,
        pub format: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub webhook_subscription_create: Option<Payload>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub webhook_subscription: Option<CreatedSubscription>,
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CreatedSubscription {
        pub id: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct UserError {
        #[serde(default)]
        pub field: Option<Vec<String>>,
        pub message: String,
    }
}

impl GraphQLQuery for WebhookSubscriptionCreate {
    type Variables = webhook_subscription_create::Variables;
    type ResponseData = webhook_subscription_create::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: webhook_subscription_create::QUERY,
            operation_name: webhook_subscription_create::OPERATION_NAME,
        }
    }
}

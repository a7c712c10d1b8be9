//! GraphQL-over-HTTP plumbing: request parsing for GET and POST (single or
//! batched), response serialization, the GraphiQL/Playground pages and the
//! hyper server loop shared by both endpoint variants.

use std::convert::{Infallible, TryFrom, TryInto};
use std::net::SocketAddr;
use std::sync::Arc;

use failure::{Error as Failure, Fail};
use http::{header, method::Method, status::StatusCode};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};
use juniper::{
    graphql_value, http as juniper_http, EmptySubscription, FieldError, GraphQLTypeAsync, RootNode,
};
use juniper_http::GraphQLRequest as GqlR;
use log::debug;
use percent_encoding::percent_decode_str;

use crate::context::Context;

#[derive(Debug, Fail)]
enum Error {
    #[fail(display = "InvalidMethod")]
    InvalidMethod(Method),
    #[fail(display = "Missing query argument")]
    MissingQuery,
    #[fail(display = "Missing post body")]
    MissingPostBody,
    #[fail(display = "Invalid body")]
    InvalidBody,
    #[fail(display = "Prohibit extra field")]
    ProhibitExtraField(String),
    #[fail(display = "Invalid query string encoding")]
    InvalidQueryString,
    #[fail(display = "Query parameter must not occur more than once")]
    MultipleQueryParameter,
    #[fail(display = "Operation name parameter must not occur more than once")]
    MultipleOperationNameParameter,
    #[fail(display = "Variables parameter must not occur more than once")]
    MultipleVariablesParameter,
    #[fail(display = "Invalid variables parameter")]
    InvalidVariablesParameter,
}

/// Root node shape shared by both schema variants.
pub type Schema<QueryT, MutationT> =
    RootNode<'static, QueryT, MutationT, EmptySubscription<Context>>;

#[derive(Debug, serde_derive::Deserialize, PartialEq)]
#[serde(untagged)]
enum GraphQLBatchRequest {
    Single(GqlR),
    Batch(Vec<GqlR>),
}

impl GraphQLBatchRequest {
    pub async fn execute<QueryT, MutationT>(
        &self,
        root_node: &Schema<QueryT, MutationT>,
        context: &Context,
    ) -> GraphQLBatchResponse
    where
        QueryT: GraphQLTypeAsync<Context = Context>,
        QueryT::TypeInfo: Sync,
        MutationT: GraphQLTypeAsync<Context = Context>,
        MutationT::TypeInfo: Sync,
    {
        match self {
            GraphQLBatchRequest::Single(request) => {
                GraphQLBatchResponse::Single(request.execute(root_node, context).await)
            }
            GraphQLBatchRequest::Batch(requests) => {
                let mut responses = Vec::with_capacity(requests.len());
                for request in requests {
                    responses.push(request.execute(root_node, context).await);
                }
                GraphQLBatchResponse::Batch(responses)
            }
        }
    }

    pub fn operation_names(&self) -> Vec<Option<&str>> {
        match self {
            GraphQLBatchRequest::Single(req) => vec![req.operation_name()],
            GraphQLBatchRequest::Batch(reqs) => {
                reqs.iter().map(|req| req.operation_name()).collect()
            }
        }
    }
}

#[derive(serde_derive::Serialize)]
#[serde(untagged)]
enum GraphQLBatchResponse {
    Single(juniper_http::GraphQLResponse),
    Batch(Vec<juniper_http::GraphQLResponse>),
}

impl GraphQLBatchResponse {
    fn is_ok(&self) -> bool {
        match self {
            GraphQLBatchResponse::Single(response) => response.is_ok(),
            GraphQLBatchResponse::Batch(responses) => {
                responses.iter().all(|response| response.is_ok())
            }
        }
    }
}

fn response(status_code: StatusCode, content_type: &str, body: String) -> Response<Body> {
    Response::builder()
        .status(status_code)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

fn html(body: String) -> Response<Body> {
    response(StatusCode::OK, "text/html; charset=utf-8", body)
}

fn json(status_code: StatusCode, body: String) -> Response<Body> {
    response(status_code, "application/json", body)
}

/// Constructs an error response outside of the normal execution flow
pub fn error(status_code: StatusCode, error: FieldError) -> Response<Body> {
    let response = juniper_http::GraphQLResponse::error(error);
    let body = serde_json::to_string(&response).unwrap();
    json(status_code, body)
}

fn bad_request(err: Failure) -> Response<Body> {
    error(
        StatusCode::BAD_REQUEST,
        FieldError::new(err, graphql_value!(null)),
    )
}

/// Generate an HTML page containing GraphiQL
pub fn graphiql_source(graphql_endpoint_url: &str) -> Response<Body> {
    html(juniper_http::graphiql::graphiql_source(
        graphql_endpoint_url,
        None,
    ))
}

/// Generate an HTML page containing GraphQL Playground
pub fn playground_source(graphql_endpoint_url: &str) -> Response<Body> {
    html(juniper_http::playground::playground_source(
        graphql_endpoint_url,
        None,
    ))
}

/// Query-string form of a request: `variables` arrives as a JSON string.
#[derive(Clone, PartialEq, Debug)]
struct GetGraphQLRequest {
    query: String,
    operation_name: Option<String>,
    variables: Option<String>,
}

impl TryFrom<GetGraphQLRequest> for GqlR {
    type Error = Failure;

    fn try_from(get_req: GetGraphQLRequest) -> Result<Self, Self::Error> {
        let GetGraphQLRequest {
            query,
            operation_name,
            variables,
        } = get_req;
        let variables = match variables {
            Some(variables) => match serde_json::from_str(&variables) {
                Ok(variables) => Some(variables),
                Err(_) => return Err(Error::InvalidVariablesParameter.into()),
            },
            None => None,
        };
        Ok(Self::new(query, operation_name, variables))
    }
}

fn decode_component(raw: &str) -> Result<String, Failure> {
    let spaced = raw.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(decoded) => Ok(decoded.into_owned()),
        Err(_) => Err(Error::InvalidQueryString.into()),
    }
}

fn parse_query_string(raw: &str) -> Result<Vec<(String, String)>, Failure> {
    let mut pairs = Vec::new();
    for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
        let mut parts = pair.splitn(2, '=');
        let key = decode_component(parts.next().unwrap_or_default())?;
        let value = decode_component(parts.next().unwrap_or_default())?;
        pairs.push((key, value));
    }
    Ok(pairs)
}

/// Simple wrapper around an incoming GraphQL request
///
/// Built from either the GET query string or a POST body; a POST body may
/// carry a single request object or an array of them.
#[derive(Debug, PartialEq)]
pub struct GraphQLRequest(GraphQLBatchRequest);

impl GraphQLRequest {
    fn from_get(raw_query: &str) -> Result<Self, Failure> {
        let mut query: Option<String> = None;
        let mut operation_name: Option<String> = None;
        let mut variables: Option<String> = None;
        for (key, value) in parse_query_string(raw_query)? {
            match key.as_str() {
                "query" => {
                    if value.is_empty() {
                        return Err(Error::MissingQuery.into());
                    } else if query.replace(value).is_some() {
                        return Err(Error::MultipleQueryParameter.into());
                    }
                }
                "operationName" => {
                    if operation_name.replace(value).is_some() {
                        return Err(Error::MultipleOperationNameParameter.into());
                    }
                }
                "variables" => {
                    if variables.replace(value).is_some() {
                        return Err(Error::MultipleVariablesParameter.into());
                    }
                }
                _ => return Err(Error::ProhibitExtraField(key.clone()).into()),
            }
        }
        let query = match query {
            Some(query) => query,
            None => return Err(Error::MissingQuery.into()),
        };
        let req = GetGraphQLRequest {
            query,
            operation_name,
            variables,
        };
        Ok(Self(GraphQLBatchRequest::Single(req.try_into()?)))
    }

    fn from_post(body: &str) -> Result<Self, Failure> {
        match serde_json::from_str::<GraphQLBatchRequest>(body) {
            Ok(request) => Ok(Self(request)),
            Err(_) => Err(Error::InvalidBody.into()),
        }
    }

    /// Execute an incoming GraphQL query
    pub async fn execute<QueryT, MutationT>(
        &self,
        root_node: &Schema<QueryT, MutationT>,
        context: &Context,
    ) -> Response<Body>
    where
        QueryT: GraphQLTypeAsync<Context = Context>,
        QueryT::TypeInfo: Sync,
        MutationT: GraphQLTypeAsync<Context = Context>,
        MutationT::TypeInfo: Sync,
    {
        let response = self.0.execute(root_node, context).await;
        let status_code = if response.is_ok() {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };
        let body = serde_json::to_string(&response).unwrap();
        json(status_code, body)
    }

    /// Returns the operation names associated with this request.
    ///
    /// For batch requests there will be multiple names.
    pub fn operation_names(&self) -> Vec<Option<&str>> {
        self.0.operation_names()
    }
}

async fn read_body(body: Body) -> Result<String, Failure> {
    let bytes = hyper::body::to_bytes(body)
        .await
        .map_err(|_| Error::MissingPostBody)?;
    if bytes.is_empty() {
        return Err(Error::MissingPostBody.into());
    }
    String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidBody.into())
}

/// GraphQL handler for GET and POST requests, plus the two IDE pages.
pub struct GraphQLHandler<QueryT, MutationT>
where
    QueryT: GraphQLTypeAsync<Context = Context>,
    QueryT::TypeInfo: Sync,
    MutationT: GraphQLTypeAsync<Context = Context>,
    MutationT::TypeInfo: Sync,
{
    root_node: Arc<Schema<QueryT, MutationT>>,
    context: Arc<Context>,
}

impl<QueryT, MutationT> GraphQLHandler<QueryT, MutationT>
where
    QueryT: GraphQLTypeAsync<Context = Context> + Send + Sync + 'static,
    QueryT::TypeInfo: Send + Sync,
    MutationT: GraphQLTypeAsync<Context = Context> + Send + Sync + 'static,
    MutationT::TypeInfo: Send + Sync,
{
    pub fn new(root_node: Schema<QueryT, MutationT>, context: Context) -> Self {
        Self {
            root_node: Arc::new(root_node),
            context: Arc::new(context),
        }
    }

    async fn run(&self, request: GraphQLRequest) -> Response<Body> {
        debug!("executing operations {:?}", request.operation_names());
        request.execute(&self.root_node, &self.context).await
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let (parts, body) = req.into_parts();
        match (&parts.method, parts.uri.path()) {
            (&Method::GET, "/graphiql") => graphiql_source("/graphql"),
            (&Method::GET, "/playground") => playground_source("/graphql"),
            (&Method::GET, "/graphql") => {
                let raw_query = parts.uri.query().unwrap_or_default();
                match GraphQLRequest::from_get(raw_query) {
                    Ok(request) => self.run(request).await,
                    Err(err) => bad_request(err),
                }
            }
            (&Method::POST, "/graphql") => {
                let request = match read_body(body).await {
                    Ok(body) => GraphQLRequest::from_post(&body),
                    Err(err) => Err(err),
                };
                match request {
                    Ok(request) => self.run(request).await,
                    Err(err) => bad_request(err),
                }
            }
            (_, "/graphql") => error(
                StatusCode::METHOD_NOT_ALLOWED,
                FieldError::new(
                    Error::InvalidMethod(parts.method.clone()),
                    graphql_value!(null),
                ),
            ),
            _ => response(StatusCode::NOT_FOUND, "text/plain", String::new()),
        }
    }

    /// Serve GraphQL over HTTP on the given address until the process dies.
    pub async fn serve(self, addr: SocketAddr) -> hyper::Result<()> {
        let handler = Arc::new(self);
        let make_svc = make_service_fn(move |_conn| {
            let handler = Arc::clone(&handler);
            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    let handler = Arc::clone(&handler);
                    async move { Ok::<_, Infallible>(handler.handle(req).await) }
                }))
            }
        });
        Server::bind(&addr).serve(make_svc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_request_parses_query_and_variables() {
        let raw = "query=query%20Tweet(%24id%3A%20ID!)%20%7B%20tweet(id%3A%20%24id)%20%7B%20text%20%7D%20%7D\
                   &operationName=Tweet&variables=%7B%22id%22%3A%20%221%22%7D";
        let request = GraphQLRequest::from_get(raw).unwrap();
        assert_eq!(request.operation_names(), vec![Some("Tweet")]);
    }

    #[test]
    fn get_request_requires_a_query() {
        assert!(GraphQLRequest::from_get("").is_err());
        assert!(GraphQLRequest::from_get("operationName=Foo").is_err());
        assert!(GraphQLRequest::from_get("query=").is_err());
    }

    #[test]
    fn get_request_rejects_duplicate_parameters() {
        let raw = "query=%7BallUsers%7Bid%7D%7D&query=%7BallTweets%7Bid%7D%7D";
        assert!(GraphQLRequest::from_get(raw).is_err());
    }

    #[test]
    fn get_request_rejects_unknown_parameters() {
        let raw = "query=%7BallUsers%7Bid%7D%7D&debug=1";
        assert!(GraphQLRequest::from_get(raw).is_err());
    }

    #[test]
    fn get_request_rejects_undecodable_variables() {
        let raw = "query=%7BallUsers%7Bid%7D%7D&variables=not-json";
        assert!(GraphQLRequest::from_get(raw).is_err());
    }

    #[test]
    fn post_body_accepts_a_single_request() {
        let body = r#"{"query": "{ allUsers { id } }"}"#;
        let request = GraphQLRequest::from_post(body).unwrap();
        assert!(matches!(request.0, GraphQLBatchRequest::Single(_)));
    }

    #[test]
    fn post_body_accepts_object_variables() {
        let body = r#"{
            "query": "query Tweet($id: ID!) { tweet(id: $id) { text } }",
            "operationName": "Tweet",
            "variables": {"id": "1"}
        }"#;
        let request = GraphQLRequest::from_post(body).unwrap();
        assert_eq!(request.operation_names(), vec![Some("Tweet")]);
    }

    #[test]
    fn post_body_accepts_a_batch() {
        let body = r#"[
            {"query": "{ allUsers { id } }"},
            {"query": "{ allTweets { id } }"}
        ]"#;
        let request = GraphQLRequest::from_post(body).unwrap();
        assert_eq!(request.operation_names().len(), 2);
    }

    #[test]
    fn post_body_rejects_garbage() {
        assert!(GraphQLRequest::from_post("not json").is_err());
        assert!(GraphQLRequest::from_post("").is_err());
    }
}

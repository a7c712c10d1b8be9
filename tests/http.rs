//! Transport-level tests: routing, GET/POST parity, batching and malformed
//! input, exercised directly through the request handler.

use http::header;
use hyper::{Body, Method, Request, Response, StatusCode};

use tweetql::context::Context;
use tweetql::http::GraphQLHandler;
use tweetql::schema::tweets::{schema, Mutation, Query};
use tweetql::upstream::MovieCatalog;

fn seeded_handler() -> GraphQLHandler<Query, Mutation> {
    let movies = MovieCatalog::new("http://127.0.0.1:1").unwrap();
    GraphQLHandler::new(schema(), Context::seeded(movies))
}

fn post(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn post_executes_a_query() {
    let handler = seeded_handler();
    let response = handler
        .handle(post(r#"{"query": "{ allUsers { fullName } }"}"#))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body = body_json(response).await;
    assert_eq!(body["data"]["allUsers"][0]["fullName"], "six water");
    assert_eq!(body["data"]["allUsers"][1]["fullName"], "seven stone");
}

#[tokio::test]
async fn get_and_post_agree() {
    let handler = seeded_handler();
    let via_post = handler
        .handle(post(r#"{"query": "{ allTweets { id text } }"}"#))
        .await;
    let via_get = handler
        .handle(get(
            "/graphql?query=%7B%20allTweets%20%7B%20id%20text%20%7D%20%7D",
        ))
        .await;
    assert_eq!(via_get.status(), StatusCode::OK);
    assert_eq!(body_json(via_post).await, body_json(via_get).await);
}

#[tokio::test]
async fn get_accepts_variables_as_a_json_string() {
    let handler = seeded_handler();
    let response = handler
        .handle(get(
            "/graphql?query=query%20Tweet(%24id%3A%20ID!)%20%7B%20tweet(id%3A%20%24id)%20%7B%20text%20%7D%20%7D\
             &variables=%7B%22id%22%3A%20%222%22%7D",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["tweet"]["text"], "hello2");
}

#[tokio::test]
async fn batch_bodies_return_an_array_of_responses() {
    let handler = seeded_handler();
    let response = handler
        .handle(post(
            r#"[
                {"query": "{ allUsers { id } }"},
                {"query": "{ allTweets { id } }"}
            ]"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let batch = body.as_array().expect("batch response must be an array");
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["data"]["allUsers"][0]["id"], "1");
    assert_eq!(batch[1]["data"]["allTweets"][1]["id"], "2");
}

#[tokio::test]
async fn mutations_run_over_http() {
    let handler = seeded_handler();
    let response = handler
        .handle(post(
            r#"{"query": "mutation { postTweet(text: \"new\", userId: \"1\") { id } }"}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["postTweet"]["id"], "3");
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let handler = seeded_handler();
    let response = handler.handle(post("not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["errors"].is_array());
}

#[tokio::test]
async fn empty_bodies_are_bad_requests() {
    let handler = seeded_handler();
    let response = handler.handle(post("")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_fields_fail_validation_with_bad_request() {
    let handler = seeded_handler();
    let response = handler
        .handle(post(r#"{"query": "{ nope }"}"#))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["errors"].is_array());
}

#[tokio::test]
async fn other_methods_on_the_endpoint_are_rejected() {
    let handler = seeded_handler();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/graphql")
        .body(Body::empty())
        .unwrap();
    let response = handler.handle(request).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let handler = seeded_handler();
    let response = handler.handle(get("/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ide_pages_are_served_as_html() {
    let handler = seeded_handler();
    for path in ["/graphiql", "/playground"] {
        let response = handler.handle(get(path)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }
}

use std::time::Duration;

use failure::Fail;
use juniper::{graphql_value, FieldError, GraphQLObject, IntoFieldError, ScalarValue};
use serde_derive::Deserialize;

/// Public base of the YTS REST API.
pub const YTS_API_BASE: &str = "https://yts.mx/api/v2";

/// Per-request ceiling; a hung upstream connection fails the field instead
/// of hanging the query.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Fail)]
pub enum UpstreamError {
    #[fail(display = "movie catalog request failed: {}", _0)]
    Http(#[fail(cause)] reqwest::Error),
    #[fail(display = "movie catalog sent an undecodable body: {}", _0)]
    Decode(#[fail(cause)] reqwest::Error),
    #[fail(display = "movie catalog response carries no data payload")]
    MissingData,
}

impl<S: ScalarValue> IntoFieldError<S> for UpstreamError {
    fn into_field_error(self) -> FieldError<S> {
        let extensions = match &self {
            UpstreamError::Http(_) => graphql_value!({"upstream": "network"}),
            UpstreamError::Decode(_) => graphql_value!({"upstream": "decode"}),
            UpstreamError::MissingData => graphql_value!({"upstream": "empty"}),
        };
        FieldError::new(self, extensions)
    }
}

///
/// GraphQL type for a movie
///
/// Shape dictated by the upstream API; decoded from its JSON and forwarded
/// unmodified. Never stored locally.
///
#[derive(Clone, Debug, GraphQLObject, Deserialize)]
pub struct Movie {
    pub id: i32,
    pub url: String,
    pub imdb_code: String,
    pub title: String,
    pub title_english: String,
    pub title_long: String,
    pub slug: String,
    pub year: i32,
    pub rating: f64,
    pub runtime: i32,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description_full: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub yt_trailer_code: Option<String>,
    pub language: String,
    #[serde(default)]
    pub mpa_rating: Option<String>,
    pub background_image: String,
    pub small_cover_image: String,
    pub medium_cover_image: String,
    pub large_cover_image: String,
}

/// Response envelope shared by both catalog endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    movies: Option<Vec<Movie>>,
    #[serde(default)]
    movie: Option<Movie>,
}

///
/// Read-through client for the movie catalog. One outbound GET per
/// invocation, no caching, no retry.
///
pub struct MovieCatalog {
    client: reqwest::Client,
    base: String,
}

impl MovieCatalog {
    pub fn new<S: Into<String>>(base: S) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(UpstreamError::Http)?;
        Ok(Self {
            client,
            base: base.into(),
        })
    }

    /// GET `{base}/list_movies.json`, forward `data.movies`.
    pub async fn list_movies(&self) -> Result<Vec<Movie>, UpstreamError> {
        let url = format!("{}/list_movies.json", self.base);
        let envelope = self.fetch(self.client.get(&url)).await?;
        envelope
            .data
            .and_then(|payload| payload.movies)
            .ok_or(UpstreamError::MissingData)
    }

    /// GET `{base}/movie_details.json?movie_id={id}`, forward `data.movie`.
    /// An envelope without a movie is a modeled absence, not an error.
    pub async fn movie_details(&self, id: &str) -> Result<Option<Movie>, UpstreamError> {
        let url = format!("{}/movie_details.json", self.base);
        let request = self.client.get(&url).query(&[("movie_id", id)]);
        let envelope = self.fetch(request).await?;
        let payload = envelope.data.ok_or(UpstreamError::MissingData)?;
        Ok(payload.movie)
    }

    async fn fetch(&self, request: reqwest::RequestBuilder) -> Result<Envelope, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(UpstreamError::Http)?
            .error_for_status()
            .map_err(UpstreamError::Http)?;
        response.json().await.map_err(UpstreamError::Decode)
    }
}

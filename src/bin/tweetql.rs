use failure::Fail;
use log::info;

use tweetql::context::Context;
use tweetql::http::GraphQLHandler;
use tweetql::schema::tweets::schema;
use tweetql::upstream::{MovieCatalog, YTS_API_BASE};

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let movies = MovieCatalog::new(YTS_API_BASE).map_err(|err| err.compat())?;
    let context = Context::seeded(movies);
    let root_node = schema();
    let handler = GraphQLHandler::new(root_node, context);
    let addr = ([127, 0, 0, 1], 4000).into();
    info!("Running on http://{}/graphql", addr);
    handler.serve(addr).await?;
    Ok(())
}

/*!

# tweetql

Two toy [GraphQL][GraphQL] endpoints built on [Juniper][Juniper]:

* `tweetql` exposes an in-memory list of tweets and users with query and
  mutation resolvers.
* `movieql` serves the same tweet surface plus a thin passthrough to the
  [YTS][YTS] movie catalog REST API.

Both binaries share this library: the [`store`](store) module holds the
mutable collections, [`schema`](schema) defines the two root-node variants,
[`upstream`](upstream) talks to the movie catalog and [`http`](http) serves
GraphQL over HTTP with GraphiQL and Playground pages.

The data lives for the process lifetime only; restarting a binary resets the
tweet feed to its seed state.

[Juniper]: https://github.com/graphql-rust/juniper
[GraphQL]: http://graphql.org
[YTS]: https://yts.mx/api

*/

pub mod context;
pub mod http;
pub mod schema;
pub mod store;
pub mod types;
pub mod upstream;

//! Aggregation pipelines.

use std::fmt;

use async_trait::async_trait;
use bson::Document;
use serde::de::DeserializeOwned;

use crate::{
    document::{from_document, from_documents},
    error::DatabaseResult,
};

/// Backend half of a [`Pipe`], owning the session leased for it.
#[async_trait]
pub trait PipeExecutor: Send {
    /// Runs the pipeline and returns every resulting document.
    async fn all(&mut self, pipeline: Vec<Document>) -> DatabaseResult<Vec<Document>>;

    /// Runs the pipeline and returns the first resulting document.
    async fn one(&mut self, pipeline: Vec<Document>) -> DatabaseResult<Option<Document>>;
}

/// An aggregation pipeline bound to a backend session.
///
/// Like [`Query`](crate::query::Query), running it consumes the handle and
/// releases the session.
pub struct Pipe {
    pipeline: Vec<Document>,
    executor: Box<dyn PipeExecutor>,
}

impl Pipe {
    /// Creates a pipe over the given stages.
    pub fn new(pipeline: Vec<Document>, executor: Box<dyn PipeExecutor>) -> Self {
        Self { pipeline, executor }
    }

    /// The pipeline stages.
    pub fn pipeline(&self) -> &[Document] {
        &self.pipeline
    }

    /// Runs the pipeline and returns every resulting document.
    pub async fn all(mut self) -> DatabaseResult<Vec<Document>> {
        self.executor.all(self.pipeline).await
    }

    /// Runs the pipeline and decodes every resulting document as `T`.
    pub async fn all_as<T>(self) -> DatabaseResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        from_documents(self.all().await?)
    }

    /// Runs the pipeline and returns the first resulting document.
    pub async fn one(mut self) -> DatabaseResult<Option<Document>> {
        self.executor.one(self.pipeline).await
    }

    /// Runs the pipeline and decodes the first resulting document as `T`.
    pub async fn one_as<T>(self) -> DatabaseResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.one().await?.map(from_document).transpose()
    }
}

impl fmt::Debug for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipe").field("pipeline", &self.pipeline).finish_non_exhaustive()
    }
}

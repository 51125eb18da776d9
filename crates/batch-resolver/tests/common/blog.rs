// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A blog with articles and comments, resolved either per object ("fetching") or in batches
//! ("loading").

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_graphql_value::ConstValue;
use batch_resolver::{
    Arguments, BatchingConfig, FieldValue, ResolverRegistry, SourceObject,
    registry::{BatchOutput, ResolverRegistryBuilder},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Blog {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Article {
    pub id: u32,
    pub blog_id: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comment {
    pub id: u32,
    pub article_id: u32,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Query,
    Blog(Blog),
    Article(Article),
    Comment(Comment),
}

impl SourceObject for Entity {
    fn type_name(&self) -> &str {
        match self {
            Entity::Query => "Query",
            Entity::Blog(_) => "Blog",
            Entity::Article(_) => "Article",
            Entity::Comment(_) => "Comment",
        }
    }

    fn property(&self, field_name: &str) -> Option<FieldValue<Self>> {
        let value = match (self, field_name) {
            (Entity::Blog(blog), "name") => blog.name.clone(),
            (Entity::Article(article), "title") => article.title.clone(),
            (Entity::Comment(comment), "content") => comment.content.clone(),
            _ => return None,
        };
        Some(FieldValue::string(value))
    }
}

pub const BLOG_NAMES: [&str; 2] = ["Rust", "GraphQL"];
pub const ARTICLE_TITLES: [&str; 4] = ["Ownership", "Lifetimes", "Schemas", "Batching"];
pub const COMMENTS_PER_ARTICLE: u32 = 3;

/// The in-memory backend, also the execution context. Counts how often each resolver hits it.
#[derive(Default)]
pub struct Repository {
    pub blogs_calls: AtomicUsize,
    pub articles_calls: AtomicUsize,
    pub blog_calls: AtomicUsize,
    pub comments_calls: AtomicUsize,
    pub article_calls: AtomicUsize,
}

impl Repository {
    pub fn blogs(&self) -> Vec<Blog> {
        (1..)
            .zip(BLOG_NAMES)
            .map(|(id, name)| Blog {
                id,
                name: name.to_string(),
            })
            .collect()
    }

    /// Two articles per blog.
    pub fn articles(&self) -> Vec<Article> {
        (1..)
            .zip(ARTICLE_TITLES)
            .map(|(id, title)| Article {
                id,
                blog_id: (id + 1) / 2,
                title: title.to_string(),
            })
            .collect()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.articles()
            .into_iter()
            .flat_map(|article| {
                (1..=COMMENTS_PER_ARTICLE).map(move |index| {
                    let id = (article.id - 1) * COMMENTS_PER_ARTICLE + index;
                    Comment {
                        id,
                        article_id: article.id,
                        content: format!("comment {id}"),
                    }
                })
            })
            .collect()
    }

    pub fn calls(&self) -> [usize; 5] {
        [
            &self.blogs_calls,
            &self.articles_calls,
            &self.blog_calls,
            &self.comments_calls,
            &self.article_calls,
        ]
        .map(|counter| counter.load(Ordering::SeqCst))
    }
}

fn count(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

fn limit(arguments: &Arguments) -> usize {
    match arguments.get("limit") {
        Some(ConstValue::Number(number)) => number.as_u64().map_or(usize::MAX, |n| n as usize),
        _ => usize::MAX,
    }
}

fn articles_of(repository: &Repository, blog: &Blog) -> FieldValue<Entity> {
    FieldValue::objects(
        repository
            .articles()
            .into_iter()
            .filter(|article| article.blog_id == blog.id)
            .map(Entity::Article),
    )
}

fn blog_of(repository: &Repository, article: &Article) -> FieldValue<Entity> {
    FieldValue::optional(
        repository
            .blogs()
            .into_iter()
            .find(|blog| blog.id == article.blog_id)
            .map(|blog| FieldValue::Object(Entity::Blog(blog))),
    )
}

fn comments_of(repository: &Repository, article: &Article, limit: usize) -> FieldValue<Entity> {
    FieldValue::objects(
        repository
            .comments()
            .into_iter()
            .filter(|comment| comment.article_id == article.id)
            .take(limit)
            .map(Entity::Comment),
    )
}

fn article_of(repository: &Repository, comment: &Comment) -> FieldValue<Entity> {
    FieldValue::optional(
        repository
            .articles()
            .into_iter()
            .find(|article| article.id == comment.article_id)
            .map(|article| FieldValue::Object(Entity::Article(article))),
    )
}

fn each_source(
    sources: impl IntoIterator<Item = Entity>,
    value: impl Fn(&Entity) -> Option<FieldValue<Entity>>,
) -> BatchOutput<Entity> {
    sources
        .into_iter()
        .filter_map(|source| value(&source).map(|value| (source, value)))
        .collect::<HashMap<_, _>>()
}

fn query_blogs(builder: &mut ResolverRegistryBuilder<Entity, Repository>) {
    builder
        .simple("Query", "blogs")
        .resolve(|_, repository| async move {
            count(&repository.blogs_calls);
            Ok(FieldValue::objects(
                repository.blogs().into_iter().map(Entity::Blog),
            ))
        });
}

/// Every field resolved once per object.
pub fn fetching_registry() -> ResolverRegistry<Entity, Repository> {
    let mut builder = ResolverRegistry::builder(BatchingConfig::default());
    query_blogs(&mut builder);
    builder
        .simple("Blog", "articles")
        .resolve(|source, repository| async move {
            count(&repository.articles_calls);
            match source {
                Entity::Blog(blog) => Ok(articles_of(&repository, &blog)),
                _ => Ok(FieldValue::Null),
            }
        })
        .simple("Article", "blog")
        .resolve(|source, repository| async move {
            count(&repository.blog_calls);
            match source {
                Entity::Article(article) => Ok(blog_of(&repository, &article)),
                _ => Ok(FieldValue::Null),
            }
        })
        .simple("Article", "comments")
        .with_arguments(|source, arguments, repository| async move {
            count(&repository.comments_calls);
            match source {
                Entity::Article(article) => {
                    Ok(comments_of(&repository, &article, limit(&arguments)))
                }
                _ => Ok(FieldValue::Null),
            }
        })
        .simple("Comment", "article")
        .resolve(|source, repository| async move {
            count(&repository.article_calls);
            match source {
                Entity::Comment(comment) => Ok(article_of(&repository, &comment)),
                _ => Ok(FieldValue::Null),
            }
        });
    builder
        .build()
        .expect("fetching resolvers are well-formed")
}

/// Every non-root field resolved once per dispatch tick and argument set.
pub fn loading_registry() -> ResolverRegistry<Entity, Repository> {
    loading_registry_with(BatchingConfig::default())
}

pub fn loading_registry_with(config: BatchingConfig) -> ResolverRegistry<Entity, Repository> {
    let mut builder = ResolverRegistry::builder(config);
    query_blogs(&mut builder);
    builder
        .batched("Blog", "articles")
        .resolve(|sources, repository| async move {
            count(&repository.articles_calls);
            Ok(each_source(sources, |source| match source {
                Entity::Blog(blog) => Some(articles_of(&repository, blog)),
                _ => None,
            }))
        })
        .batched("Article", "blog")
        .resolve(|sources, repository| async move {
            count(&repository.blog_calls);
            Ok(each_source(sources, |source| match source {
                Entity::Article(article) => Some(blog_of(&repository, article)),
                _ => None,
            }))
        })
        .batched("Article", "comments")
        .with_arguments(|sources, arguments, repository| async move {
            count(&repository.comments_calls);
            let limit = limit(&arguments);
            Ok(each_source(sources, |source| match source {
                Entity::Article(article) => Some(comments_of(&repository, article, limit)),
                _ => None,
            }))
        })
        .batched("Comment", "article")
        .resolve(|sources, repository| async move {
            count(&repository.article_calls);
            Ok(each_source(sources, |source| match source {
                Entity::Comment(comment) => Some(article_of(&repository, comment)),
                _ => None,
            }))
        });
    builder
        .build()
        .expect("loading resolvers are well-formed")
}

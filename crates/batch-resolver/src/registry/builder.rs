// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{collections::HashMap, future::Future, sync::Arc};

use futures::FutureExt;

use crate::{
    arguments::Arguments,
    config::BatchingConfig,
    error::{ConfigurationError, ResolverError},
    selection::Selection,
    value::{FieldValue, Source, Sources},
};

use super::{
    ResolverRegistry,
    definition::{
        BatchOutput, Parameter, ResolverDeclaration, ResolverFunction, ResolverId, ResolverShape,
    },
};

/// Collects resolver declarations; [ResolverRegistryBuilder::build] validates them all.
pub struct ResolverRegistryBuilder<S, C> {
    config: BatchingConfig,
    declarations: Vec<ResolverDeclaration<S, C>>,
}

impl<S: Source, C: Send + Sync + 'static> ResolverRegistryBuilder<S, C> {
    pub fn new(config: BatchingConfig) -> Self {
        Self {
            config,
            declarations: vec![],
        }
    }

    /// Add a declaration as-is. Its parameters are checked only when the registry is built.
    pub fn register(&mut self, declaration: ResolverDeclaration<S, C>) -> &mut Self {
        self.declarations.push(declaration);
        self
    }

    /// Start declaring a resolver that receives every source of a dispatch tick at once.
    pub fn batched(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> FieldRegistration<'_, S, C, Sources<S>, BatchOutput<S>> {
        FieldRegistration {
            builder: self,
            type_name: type_name.into(),
            field_name: field_name.into(),
            source_parameter: Parameter::Sources,
            wrap: ResolverFunction::Batched,
        }
    }

    /// Start declaring a resolver that is called once per source.
    pub fn simple(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> FieldRegistration<'_, S, C, S, FieldValue<S>> {
        FieldRegistration {
            builder: self,
            type_name: type_name.into(),
            field_name: field_name.into(),
            source_parameter: Parameter::Source,
            wrap: ResolverFunction::Simple,
        }
    }

    pub fn build(self) -> Result<ResolverRegistry<S, C>, ConfigurationError> {
        let mut definitions = Vec::with_capacity(self.declarations.len());
        let mut index: HashMap<String, HashMap<String, ResolverId>> = HashMap::new();

        for (position, declaration) in self.declarations.into_iter().enumerate() {
            let id = ResolverId(position);
            let definition = declaration.validate(id)?;

            let fields = index.entry(definition.type_name.clone()).or_default();
            if fields.contains_key(&definition.field_name) {
                return Err(ConfigurationError::DuplicateResolver {
                    type_name: definition.type_name,
                    field_name: definition.field_name,
                });
            }
            fields.insert(definition.field_name.clone(), id);
            definitions.push(Arc::new(definition));
        }

        Ok(ResolverRegistry {
            config: self.config,
            definitions,
            index,
        })
    }
}

/// A declaration in progress for one (type, field). Each terminal method picks the function
/// shape, derives the matching parameter list and hands the declaration back to the builder.
pub struct FieldRegistration<'a, S, C, I, O> {
    builder: &'a mut ResolverRegistryBuilder<S, C>,
    type_name: String,
    field_name: String,
    source_parameter: Parameter,
    wrap: fn(ResolverShape<I, O, C>) -> ResolverFunction<S, C>,
}

impl<'a, S, C, I, O> FieldRegistration<'a, S, C, I, O>
where
    S: Source,
    C: Send + Sync + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn resolve<F, Fut>(self, function: F) -> &'a mut ResolverRegistryBuilder<S, C>
    where
        F: Fn(I, Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ResolverError>> + Send + 'static,
    {
        let shape = ResolverShape::NoArgsNoSelection(Arc::new(move |input: I, context: Arc<C>| {
            function(input, context).boxed()
        }));
        let parameters = vec![self.source_parameter];
        self.finish(parameters, shape)
    }

    pub fn with_arguments<F, Fut>(self, function: F) -> &'a mut ResolverRegistryBuilder<S, C>
    where
        F: Fn(I, Arguments, Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ResolverError>> + Send + 'static,
    {
        let shape = ResolverShape::ArgsOnly(Arc::new(
            move |input: I, arguments: Arguments, context: Arc<C>| {
                function(input, arguments, context).boxed()
            },
        ));
        let parameters = vec![self.source_parameter, Parameter::Arguments];
        self.finish(parameters, shape)
    }

    /// Like [Self::with_selection_depth], at the configured default depth.
    pub fn with_selection<F, Fut>(self, function: F) -> &'a mut ResolverRegistryBuilder<S, C>
    where
        F: Fn(I, Selection, Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ResolverError>> + Send + 'static,
    {
        let depth = self.builder.config.default_selection_depth;
        self.with_selection_depth(depth, function)
    }

    pub fn with_selection_depth<F, Fut>(
        self,
        depth: usize,
        function: F,
    ) -> &'a mut ResolverRegistryBuilder<S, C>
    where
        F: Fn(I, Selection, Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ResolverError>> + Send + 'static,
    {
        let shape = ResolverShape::SelectionOnly(Arc::new(
            move |input: I, selection: Selection, context: Arc<C>| {
                function(input, selection, context).boxed()
            },
        ));
        let parameters = vec![self.source_parameter, Parameter::Selection { depth }];
        self.finish(parameters, shape)
    }

    pub fn with_arguments_and_selection<F, Fut>(
        self,
        depth: usize,
        function: F,
    ) -> &'a mut ResolverRegistryBuilder<S, C>
    where
        F: Fn(I, Arguments, Selection, Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ResolverError>> + Send + 'static,
    {
        let shape = ResolverShape::ArgsAndSelection(Arc::new(
            move |input: I, arguments: Arguments, selection: Selection, context: Arc<C>| {
                function(input, arguments, selection, context).boxed()
            },
        ));
        let parameters = vec![
            self.source_parameter,
            Parameter::Arguments,
            Parameter::Selection { depth },
        ];
        self.finish(parameters, shape)
    }

    fn finish(
        self,
        parameters: Vec<Parameter>,
        shape: ResolverShape<I, O, C>,
    ) -> &'a mut ResolverRegistryBuilder<S, C> {
        let function = (self.wrap)(shape);
        self.builder.register(ResolverDeclaration {
            type_name: self.type_name,
            field_name: self.field_name,
            parameters,
            function,
        })
    }
}

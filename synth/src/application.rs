// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use crate::assembly::CloudAssembly;
use crate::configuration::SynthOptions;
use crate::constants::MAX_SYNTH_PASSES;
use crate::context::Context;
use crate::errors::SynthError;
use crate::lookups::{LookupProvider, resolve_missing};
use crate::models::ParameterValues;
use crate::stack::Environment;
use crate::stacks::{appliance, network, parameters};

pub struct Application {
    options: SynthOptions,
    context: Context,
    max_passes: usize,
}

impl Application {
    /// Loads the context file named in the options.
    pub fn build(options: SynthOptions) -> Result<Self, SynthError> {
        let context = Context::load(&options.context_file)?;
        Ok(Self::with_context(options, context))
    }

    pub fn with_context(options: SynthOptions, context: Context) -> Self {
        Self {
            options,
            context,
            max_passes: MAX_SYNTH_PASSES,
        }
    }

    /// Caps the number of synthesis passes; at least one pass always runs.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Builds all three stacks once against the current context.
    #[tracing::instrument(skip(self))]
    pub fn synthesize(&mut self) -> Result<CloudAssembly, SynthError> {
        let env = Environment::new(self.options.account.clone(), self.options.region.clone());
        let values = ParameterValues::from(&self.options);

        let parameter_stack = parameters::build(env.clone(), &values)?;
        let network = network::build(env.clone(), &mut self.context)?;
        let appliance_stack = appliance::build(env, &mut self.context, &network.refs)?;

        let missing = self.context.take_missing();
        CloudAssembly::synthesize(
            vec![parameter_stack, network.stack, appliance_stack],
            missing,
        )
    }

    /// Synthesizes until every lookup is answered, then writes the assembly.
    ///
    /// With no provider, a missing lookup is an error. With a provider, missing
    /// values are fetched, saved to the context file, and synthesis repeats.
    /// At most [`MAX_SYNTH_PASSES`] passes run; anything still missing on the
    /// last pass is an error.
    #[tracing::instrument(skip_all)]
    pub async fn run<P: LookupProvider>(
        mut self,
        provider: Option<&P>,
    ) -> Result<CloudAssembly, SynthError> {
        let assembly = self.synthesize_resolved(provider).await?;
        assembly.write(&self.options.output)?;
        Ok(assembly)
    }

    pub async fn synthesize_resolved<P: LookupProvider>(
        &mut self,
        provider: Option<&P>,
    ) -> Result<CloudAssembly, SynthError> {
        let mut pass = 1;
        loop {
            let assembly = self.synthesize()?;
            if assembly.missing().is_empty() {
                tracing::info!("[synth] synthesized in {} pass(es)", pass);
                return Ok(assembly);
            }

            let keys = || assembly.missing().iter().map(|m| m.key.clone()).collect();
            let Some(provider) = provider else {
                return Err(SynthError::MissingContext(keys()));
            };
            if pass >= self.max_passes {
                return Err(SynthError::UnresolvedContext(pass, keys()));
            }

            let resolved = resolve_missing(provider, &mut self.context, assembly.missing()).await?;
            if resolved == 0 {
                return Err(SynthError::UnresolvedContext(pass, keys()));
            }
            self.context.save(&self.options.context_file)?;
            pass += 1;
        }
    }
}

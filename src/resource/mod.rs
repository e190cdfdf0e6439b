// This file is part of the terraform-provider-azurerm project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Plugin resources on top of the resource manager
//!
//! Every Azure resource implements [`ArmResource`] in terms of its own ID and
//! state; [`ArmResourceAdapter`] turns it into a plugin [`Resource`] and takes
//! care of the lifecycle shared by all of them.

use std::{borrow::Cow, fmt::Debug};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{
    schema::Schema,
    value::{Value, ValueEmpty, ValueString},
    AttributePath, Diagnostics, Resource,
};
use tracing::{info, warn};

use crate::{
    clients::{ClientHandle, Clients},
    resourceids::ResourceId,
    utils::{WithSchema, WithValidate},
};

pub mod schema;
mod timeouts;

pub use timeouts::{deadline, with_deadline, Operation, Timeouts, TimeoutsBlock};

/// State of an Azure resource
pub trait ArmState<'a>:
    Serialize + Deserialize<'a> + WithSchema + WithValidate + Clone + Debug + Default + Send + Sync
{
    fn id(&self) -> &ValueString<'a>;
    fn id_mut(&mut self) -> &mut ValueString<'a>;
    fn timeouts(&self) -> &Value<TimeoutsBlock<'a>>;

    /// Location attribute, when the resource has one
    fn location_mut(&mut self) -> Option<&mut ValueString<'a>> {
        None
    }
}

/// Azure resource managed through the resource manager
#[async_trait]
pub trait ArmResource: Send + Sync + 'static {
    /// Terraform type, e.g. `azurerm_resource_group`
    const TYPE_NAME: &'static str;
    const TIMEOUTS: Timeouts;

    type Id: ResourceId + Send + Sync;
    type State<'a>: ArmState<'a>;

    /// ID of the resource described by the configuration
    fn build_id<'a>(&self, clients: &Clients, config: &Self::State<'a>) -> Result<Self::Id>;

    /// Mark the computed attributes unknown before the creation
    fn plan_create<'a>(&self, state: &mut Self::State<'a>) {
        _ = state;
    }

    /// Plan an update: adjust the computed attributes affected by the change, and
    /// return the attributes whose change requires a new resource
    fn plan_update<'a>(
        &self,
        prior: &Self::State<'a>,
        planned: &mut Self::State<'a>,
    ) -> Vec<AttributePath>;

    async fn exists(&self, clients: &Clients, id: &Self::Id) -> Result<bool>;

    async fn create<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        planned: &Self::State<'a>,
    ) -> Result<()>;

    /// Read the resource, `None` when it does not exist anymore
    ///
    /// The attributes that are not returned by the API are copied from `state`.
    async fn read<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        state: Self::State<'a>,
    ) -> Result<Option<Self::State<'a>>>;

    async fn update<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        prior: &Self::State<'a>,
        planned: &Self::State<'a>,
    ) -> Result<()>;

    async fn delete<'a>(&self, clients: &Clients, id: &Self::Id, state: &Self::State<'a>)
        -> Result<()>;
}

/// Plugin resource for an [`ArmResource`]
///
/// A null state means the resource does not exist: this is what is returned
/// when the resource has been deleted outside of Terraform.
#[derive(Debug)]
pub struct ArmResourceAdapter<R> {
    resource: R,
    clients: ClientHandle,
}

impl<R: ArmResource> ArmResourceAdapter<R> {
    pub fn new(resource: R, clients: ClientHandle) -> Self {
        Self { resource, clients }
    }

    /// Parse the ID stored in the state
    ///
    /// States written from API responses may carry its casing (`resourcegroups`),
    /// so literal segments are matched insensitively. Reads store the normalized form.
    fn parse_id(diags: &mut Diagnostics, id: &ValueString) -> Option<R::Id> {
        let Some(id) = id.as_deref_option() else {
            diags.error_short("The resource ID is unknown", AttributePath::new("id"));
            return None;
        };
        match R::Id::parse_insensitively(id) {
            Ok(id) => Some(id),
            Err(err) => {
                diags.error(
                    format!("Invalid {} ID", R::Id::DESCRIPTION),
                    err.to_string(),
                    AttributePath::new("id"),
                );
                None
            }
        }
    }

    /// Read the resource after it has been written, it must exist
    async fn read_back<'a>(
        &self,
        diags: &mut Diagnostics,
        clients: &Clients,
        id: &R::Id,
        mut state: R::State<'a>,
    ) -> Option<Value<R::State<'a>>> {
        *state.id_mut() = Value::Value(Cow::Owned(id.id()));
        let deadline = deadline(state.timeouts(), &R::TIMEOUTS, Operation::Read);
        let prior = state.clone();
        let result = with_deadline(
            Operation::Read,
            deadline,
            self.resource.read(clients, id, state),
        )
        .await;
        match result {
            Ok(Some(mut state)) => {
                keep_configured_location(&prior, &mut state);
                Some(Value::Value(state))
            }
            Ok(None) => {
                diags.root_error(
                    format!("Reading {}", R::TYPE_NAME),
                    format!("{id} was not found after it was written"),
                );
                None
            }
            Err(err) => {
                diags.root_error(format!("Reading {}", R::TYPE_NAME), format!("{err:#}"));
                None
            }
        }
    }
}

fn keep_configured_location<'a, S: ArmState<'a>>(prior: &S, state: &mut S) {
    let mut prior = prior.clone();
    if let (Some(prior_location), Some(location)) = (prior.location_mut(), state.location_mut()) {
        schema::suppress_location_diff(prior_location, location);
    }
}

#[async_trait]
impl<R: ArmResource> Resource for ArmResourceAdapter<R> {
    type State<'a> = Value<R::State<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(<R::State<'static> as WithSchema>::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        config.validate(diags, AttributePath::default());

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(state) = state else {
            return Some((state, private_state));
        };
        let clients = self.clients.get_or_report(diags).await?;
        let id = Self::parse_id(diags, state.id())?;

        let deadline = deadline(state.timeouts(), &R::TIMEOUTS, Operation::Read);
        let prior = state.clone();
        match with_deadline(
            Operation::Read,
            deadline,
            self.resource.read(&clients, &id, state),
        )
        .await
        {
            Ok(Some(mut state)) => {
                keep_configured_location(&prior, &mut state);
                Some((Value::Value(state), private_state))
            }
            Ok(None) => {
                warn!(
                    resource = R::TYPE_NAME,
                    id = %id.id(),
                    "resource not found, removing it from the state"
                );
                Some((Value::Null, private_state))
            }
            Err(err) => {
                diags.root_error(format!("Reading {}", R::TYPE_NAME), format!("{err:#}"));
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        if let Value::Value(state) = &mut state {
            *state.id_mut() = ValueString::Unknown;
            self.resource.plan_create(state);
        }

        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(
        Self::State<'a>,
        Self::PrivateState<'a>,
        Vec<tf_provider::AttributePath>,
    )> {
        let mut state = proposed_state;
        let mut trigger_replace = Vec::new();
        if let (Value::Value(prior), Value::Value(planned)) = (&prior_state, &mut state) {
            *planned.id_mut() = prior.id().clone();
            trigger_replace = self.resource.plan_update(prior, planned);
        }

        Some((state, prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(planned) = planned_state else {
            diags.root_error_short("The planned state of a new resource cannot be null");
            return None;
        };
        let clients = self.clients.get_or_report(diags).await?;

        let id = match self.resource.build_id(&clients, &planned) {
            Ok(id) => id,
            Err(err) => {
                diags.root_error(format!("Creating {}", R::TYPE_NAME), format!("{err:#}"));
                return None;
            }
        };

        match self.resource.exists(&clients, &id).await {
            Ok(false) => (),
            Ok(true) => {
                diags.root_error(
                    format!("Creating {}", R::TYPE_NAME),
                    format!(
                        "A resource with the ID {:?} already exists - to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for {:?} for more information.",
                        id.id(),
                        R::TYPE_NAME
                    ),
                );
                return None;
            }
            Err(err) => {
                diags.root_error(
                    format!("Checking for presence of existing {id}"),
                    format!("{err:#}"),
                );
                return None;
            }
        }

        info!(resource = R::TYPE_NAME, id = %id.id(), "creating");
        let deadline = deadline(planned.timeouts(), &R::TIMEOUTS, Operation::Create);
        if let Err(err) = with_deadline(
            Operation::Create,
            deadline,
            self.resource.create(&clients, &id, &planned),
        )
        .await
        {
            diags.root_error(format!("Creating {id}"), format!("{err:#}"));
            return None;
        }

        let state = self.read_back(diags, &clients, &id, planned).await?;
        Some((state, private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let (Value::Value(prior), Value::Value(planned)) = (prior_state, planned_state) else {
            diags.root_error_short("The state of an updated resource cannot be null");
            return None;
        };
        let clients = self.clients.get_or_report(diags).await?;
        let id = Self::parse_id(diags, prior.id())?;

        info!(resource = R::TYPE_NAME, id = %id.id(), "updating");
        let deadline = deadline(planned.timeouts(), &R::TIMEOUTS, Operation::Update);
        if let Err(err) = with_deadline(
            Operation::Update,
            deadline,
            self.resource.update(&clients, &id, &prior, &planned),
        )
        .await
        {
            diags.root_error(format!("Updating {id}"), format!("{err:#}"));
            return None;
        }

        let state = self.read_back(diags, &clients, &id, planned).await?;
        Some((state, private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let Value::Value(state) = state else {
            return Some(());
        };
        let clients = self.clients.get_or_report(diags).await?;
        let id = Self::parse_id(diags, state.id())?;

        info!(resource = R::TYPE_NAME, id = %id.id(), "deleting");
        let deadline = deadline(state.timeouts(), &R::TIMEOUTS, Operation::Delete);
        match with_deadline(
            Operation::Delete,
            deadline,
            self.resource.delete(&clients, &id, &state),
        )
        .await
        {
            Ok(()) => Some(()),
            Err(err) => {
                diags.root_error(format!("Deleting {id}"), format!("{err:#}"));
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Ok(id) = R::Id::parse(&id) else {
            for error in R::Id::validate(&id, "id") {
                diags.root_error(format!("Importing {}", R::TYPE_NAME), error);
            }
            return None;
        };

        let mut state = R::State::default();
        *state.id_mut() = Value::Value(Cow::Owned(id.id()));
        Some((Value::Value(state), Default::default()))
    }
}

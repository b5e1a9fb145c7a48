//! Delivery management Discord commands - `areas`, `vehicles` and `periods`.
//!
//! Writes are validated locally first; the caches behind autocomplete are only
//! updated with records the backend has stored.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        api::endpoints,
        bot::{
            self, BotData,
            handlers::autocomplete::{self, resolve_label},
            render,
        },
        core::{access::Component, delivery, load::LoadState, pagination::paginate},
        errors::{Error, Result},
        models::{DeliveryPeriod, PeriodWindow},
    };

    const COMPONENT: Option<Component> = Some(Component::DeliveryManagement);

    // --- Areas ---

    /// Delivery areas and their per-vehicle prices.
    #[poise::command(
        slash_command,
        subcommands("areas_list", "areas_add", "areas_edit", "areas_price", "areas_delete")
    )]
    pub async fn areas(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Area commands:\n\
            `/areas list` - Lists delivery areas\n\
            `/areas add` - Adds an area\n\
            `/areas edit` - Renames or (de)activates an area\n\
            `/areas price` - Sets or clears the price for a vehicle type\n\
            `/areas delete` - Deletes an area",
        )
        .await?;
        Ok(())
    }

    /// Lists delivery areas.
    #[poise::command(slash_command, rename = "list")]
    pub async fn areas_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_areas(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;
        if let Ok(areas) = &result {
            data.caches.areas.replace(areas.clone()).await;
        }

        let per_page = data.per_page();
        let state = LoadState::from_result(result);
        let embed = render::state_embed("Delivery areas", &state, |areas| {
            render::page_embed("Delivery areas", &paginate(areas, page.unwrap_or(1), per_page))
        });
        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }

    /// Adds a delivery area.
    #[poise::command(slash_command, rename = "add")]
    pub async fn areas_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "State or region"] state: String,
        #[description = "Area name"] name: String,
        #[description = "Accept orders for this area (default yes)"] active: Option<bool>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();
        let input = [
            ("state", Some(state)),
            ("name", Some(name)),
            ("isActive", Some(active.unwrap_or(true).to_string())),
        ];

        let result = match data
            .caches
            .areas
            .get_or_load(|| endpoints::list_areas(&data.api, &mut session))
            .await
        {
            Ok(mut areas) => delivery::create_area(&data.api, &mut session, &mut areas, &input).await,
            Err(e) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        let area = result?;
        data.caches.areas.upsert(area.clone()).await;

        ctx.send(render::embed_reply(render::record_embed("✅ Area added", &area)))
            .await?;
        Ok(())
    }

    /// Renames an area or changes whether it accepts orders.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn areas_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Area to edit"]
        #[autocomplete = "autocomplete::autocomplete_area"]
        area: String,
        #[description = "New state or region"] state: Option<String>,
        #[description = "New name"] name: Option<String>,
        #[description = "Accept orders for this area"] active: Option<bool>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let mut input = Vec::new();
        if let Some(state) = state {
            input.push(("state", Some(state)));
        }
        if let Some(name) = name {
            input.push(("name", Some(name)));
        }
        if let Some(active) = active {
            input.push(("isActive", Some(active.to_string())));
        }

        let result = match endpoints::list_areas(&data.api, &mut session).await {
            Ok(mut areas) => {
                match resolve_label(&areas, &area, |a| a.name.as_str(), "Area").map(|a| a.id) {
                    Ok(id) => delivery::edit_area(&data.api, &mut session, &mut areas, id, &input).await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        let edited = result?;
        data.caches.areas.upsert(edited.clone()).await;

        ctx.send(render::embed_reply(render::record_embed("✅ Area updated", &edited)))
            .await?;
        Ok(())
    }

    /// Sets, or clears when no price is given, an area's price for one vehicle type.
    #[poise::command(slash_command, rename = "price")]
    pub async fn areas_price(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Area"]
        #[autocomplete = "autocomplete::autocomplete_area"]
        area: String,
        #[description = "Vehicle type"]
        #[autocomplete = "autocomplete::autocomplete_vehicle_type"]
        vehicle: String,
        #[description = "Price; leave empty to remove it"] price: Option<f64>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let vehicle_types = data
            .caches
            .vehicle_types
            .get_or_load(|| endpoints::list_vehicle_types(&data.api, &mut session))
            .await;
        let result = match (vehicle_types, endpoints::list_areas(&data.api, &mut session).await) {
            (Ok(vehicle_types), Ok(mut areas)) => {
                let ids = resolve_label(&areas, &area, |a| a.name.as_str(), "Area")
                    .map(|a| a.id)
                    .and_then(|area_id| {
                        resolve_label(&vehicle_types, &vehicle, |v| v.name.as_str(), "Vehicle type")
                            .map(|v| (area_id, v.id))
                    });
                match ids {
                    Ok((area_id, vehicle_id)) => {
                        delivery::set_area_price(
                            &data.api,
                            &mut session,
                            &mut areas,
                            &vehicle_types,
                            area_id,
                            vehicle_id,
                            price,
                        )
                        .await
                    }
                    Err(e) => Err(e),
                }
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        let updated = result?;
        data.caches.areas.upsert(updated.clone()).await;

        ctx.send(render::embed_reply(render::record_embed(
            "✅ Area prices updated",
            &updated,
        )))
        .await?;
        Ok(())
    }

    /// Deletes a delivery area.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn areas_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Area to delete"]
        #[autocomplete = "autocomplete::autocomplete_area"]
        area: String,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = match endpoints::list_areas(&data.api, &mut session).await {
            Ok(mut areas) => {
                match resolve_label(&areas, &area, |a| a.name.as_str(), "Area").map(|a| a.id) {
                    Ok(id) => delivery::delete_area(&data.api, &mut session, &mut areas, id).await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        let deleted = result?;
        data.caches.areas.remove(deleted.id).await;

        ctx.say(format!("🗑️ Area '{}' ({}) deleted.", deleted.name, deleted.state))
            .await?;
        Ok(())
    }

    // --- Vehicle types ---

    /// Vehicle types and their capacities.
    #[poise::command(slash_command, subcommands("vehicles_list", "vehicles_add"))]
    pub async fn vehicles(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Vehicle commands:\n\
            `/vehicles list` - Lists vehicle types\n\
            `/vehicles add` - Adds a vehicle type",
        )
        .await?;
        Ok(())
    }

    /// Lists vehicle types.
    #[poise::command(slash_command, rename = "list")]
    pub async fn vehicles_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_vehicle_types(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;
        if let Ok(vehicle_types) = &result {
            data.caches.vehicle_types.replace(vehicle_types.clone()).await;
        }

        let per_page = data.per_page();
        let state = LoadState::from_result(result);
        let embed = render::state_embed("Vehicle types", &state, |vehicle_types| {
            render::page_embed(
                "Vehicle types",
                &paginate(vehicle_types, page.unwrap_or(1), per_page),
            )
        });
        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }

    /// Adds a vehicle type.
    #[poise::command(slash_command, rename = "add")]
    pub async fn vehicles_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name (e.g. Van)"] name: String,
        #[description = "Maximum volume in m³"] max_volume: f64,
        #[description = "Maximum weight in kg"] max_weight: f64,
        #[description = "Maximum number of packages"] max_packages: i64,
        #[description = "Base price"] base_price: Option<f64>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();
        let input = [
            ("name", Some(name)),
            ("maxVolume", Some(max_volume.to_string())),
            ("maxWeight", Some(max_weight.to_string())),
            ("maxPackages", Some(max_packages.to_string())),
            ("basePrice", base_price.map(|p| p.to_string())),
        ];

        let result = match endpoints::list_vehicle_types(&data.api, &mut session).await {
            Ok(mut vehicle_types) => {
                delivery::create_vehicle_type(&data.api, &mut session, &mut vehicle_types, &input)
                    .await
            }
            Err(e) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        let vehicle = result?;
        data.caches.vehicle_types.upsert(vehicle.clone()).await;

        ctx.send(render::embed_reply(render::record_embed(
            "✅ Vehicle type added",
            &vehicle,
        )))
        .await?;
        Ok(())
    }

    // --- Delivery periods ---

    /// Delivery periods offered per vehicle type.
    #[poise::command(
        slash_command,
        subcommands("periods_list", "periods_add_hours", "periods_add_days", "periods_delete")
    )]
    pub async fn periods(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Delivery period commands:\n\
            `/periods list` - Lists delivery periods\n\
            `/periods add_hours` - Adds a same-day hour window\n\
            `/periods add_days` - Adds a range of days\n\
            `/periods delete` - Deletes a period",
        )
        .await?;
        Ok(())
    }

    /// Lists delivery periods.
    #[poise::command(slash_command, rename = "list")]
    pub async fn periods_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Page number (default 1)"] page: Option<usize>,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = endpoints::list_delivery_periods(&data.api, &mut session).await;
        bot::close_session(ctx, &mut session, &result).await;

        let per_page = data.per_page();
        let state = LoadState::from_result(result);
        let embed = render::state_embed("Delivery periods", &state, |periods| {
            render::page_embed(
                "Delivery periods",
                &paginate(periods, page.unwrap_or(1), per_page),
            )
        });
        ctx.send(render::embed_reply(embed)).await?;
        Ok(())
    }

    async fn add_period(
        ctx: poise::Context<'_, BotData, Error>,
        name: String,
        vehicle: &str,
        price: f64,
        window: PeriodWindow,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let vehicle_types = data
            .caches
            .vehicle_types
            .get_or_load(|| endpoints::list_vehicle_types(&data.api, &mut session))
            .await;
        let result = match (
            vehicle_types,
            endpoints::list_delivery_periods(&data.api, &mut session).await,
        ) {
            (Ok(vehicle_types), Ok(mut periods)) => {
                match resolve_label(&vehicle_types, vehicle, |v| v.name.as_str(), "Vehicle type") {
                    Ok(vehicle_type) => {
                        let period = DeliveryPeriod {
                            id: 0,
                            name,
                            vehicle_type_id: vehicle_type.id,
                            price,
                            window,
                        };
                        delivery::create_period(
                            &data.api,
                            &mut session,
                            &mut periods,
                            &vehicle_types,
                            period,
                        )
                        .await
                    }
                    Err(e) => Err(e),
                }
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        let period = result?;

        ctx.send(render::embed_reply(render::record_embed(
            "✅ Delivery period added",
            &period,
        )))
        .await?;
        Ok(())
    }

    /// Adds a same-day delivery window between two hours.
    #[poise::command(slash_command, rename = "add_hours")]
    pub async fn periods_add_hours(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Period name (e.g. Evening)"] name: String,
        #[description = "Vehicle type"]
        #[autocomplete = "autocomplete::autocomplete_vehicle_type"]
        vehicle: String,
        #[description = "Price"] price: f64,
        #[description = "First hour (0-23)"] start_hour: u8,
        #[description = "End hour, exclusive (1-24)"] end_hour: u8,
    ) -> Result<()> {
        add_period(
            ctx,
            name,
            &vehicle,
            price,
            PeriodWindow::Hours {
                start_hour,
                end_hour,
            },
        )
        .await
    }

    /// Adds a delivery option that arrives within a range of days.
    #[poise::command(slash_command, rename = "add_days")]
    pub async fn periods_add_days(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Period name (e.g. Economy)"] name: String,
        #[description = "Vehicle type"]
        #[autocomplete = "autocomplete::autocomplete_vehicle_type"]
        vehicle: String,
        #[description = "Price"] price: f64,
        #[description = "Earliest day after ordering"] min_days: u16,
        #[description = "Latest day after ordering"] max_days: u16,
    ) -> Result<()> {
        add_period(
            ctx,
            name,
            &vehicle,
            price,
            PeriodWindow::Days { min_days, max_days },
        )
        .await
    }

    /// Deletes a delivery period.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn periods_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Period id"] id: i64,
    ) -> Result<()> {
        let mut session = bot::open_session(ctx, COMPONENT).await?;
        ctx.defer().await?;
        let data = ctx.data();

        let result = match endpoints::list_delivery_periods(&data.api, &mut session).await {
            Ok(mut periods) => delivery::delete_period(&data.api, &mut session, &mut periods, id).await,
            Err(e) => Err(e),
        };
        bot::close_session(ctx, &mut session, &result).await;
        result?;

        ctx.say(format!("🗑️ Delivery period #{id} deleted.")).await?;
        Ok(())
    }
}

pub use inner::*;

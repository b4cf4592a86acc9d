use chrono::{DateTime, Utc};
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use overbot_core::{
    graph::{bounds, series, RoleSeries},
    profiles::ProfileStore,
    ratings::RatingStore,
};
use overbot_framework::{error::ErrorKind, prelude::*};
use overbot_models::{discord::http::attachment::Attachment, rating::Role};
use plotters::{
    chart::{ChartBuilder, LabelAreaPosition},
    element::PathElement,
    prelude::{BitMapBackend, IntoDrawingArea},
    series::LineSeries,
    style::{Color, IntoFont, RGBColor, BLACK, BLUE, GREEN, RED, WHITE},
};
use std::{error::Error as StdError, io::Cursor};

use super::{describe_profile, has_profile, select};

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;

#[tracing::instrument(skip_all)]
pub async fn profile_graph(bot: &BotContext, ctx: &CommandContext, _args: ()) -> CommandResult {
    if !bot.database.is_premium(ctx.author_id).await? {
        ctx.respond(bot)
            .content("Ratings graphs are only available to premium members.")
            .await?;
        return Ok(());
    }
    if !has_profile(bot, ctx, ctx.author_id).await? {
        return Ok(());
    }
    let Some(profile) = select(bot, ctx, ctx.author_id, "Select a profile to graph.").await? else {
        return Ok(());
    };

    let history = bot.database.history(profile.id).await?;
    let Ok(series) = series(&history) else {
        let message = format!(
            "There are no ratings saved for **{}** yet. Check them with `/profile ratings` first.",
            describe_profile(&profile)
        );
        ctx.respond(bot).content(&message).await?;
        return Ok(());
    };

    let png = render(&describe_profile(&profile), &series)
        .map_err(|err| FrameworkError::from_parts(ErrorKind::Render, Some(err)))?;
    ctx.respond(bot)
        .attachments(&[Attachment::from_bytes("graph.png".to_string(), png, 1)])
        .await?;

    Ok(())
}

const fn color(role: Role) -> RGBColor {
    match role {
        Role::Tank => BLUE,
        Role::Offense => RED,
        Role::Support => GREEN,
    }
}

/// Draws one line per role and encodes the chart as a PNG.
fn render(title: &str, series: &[RoleSeries]) -> Result<Vec<u8>, Box<dyn StdError + Send + Sync>> {
    let bounds = bounds(series).ok_or("no ratings to plot")?;

    let mut buffer = vec![0_u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 30).into_font())
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(bounds.start..bounds.end, bounds.min..bounds.max)?;

        chart
            .configure_mesh()
            .x_label_formatter(&|x: &DateTime<Utc>| x.date_naive().to_string())
            .y_desc("Rating")
            .draw()?;

        for line in series {
            let style = color(line.role).stroke_width(2);
            chart
                .draw_series(LineSeries::new(line.points.iter().copied(), style))?
                .label(line.role.to_string())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE)
            .border_style(BLACK)
            .draw()?;
        root.present()?;
    }

    let mut bytes = Vec::new();
    PngEncoder::new(Cursor::new(&mut bytes)).write_image(
        &buffer,
        WIDTH,
        HEIGHT,
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_its_own_color() {
        assert_ne!(color(Role::Tank), color(Role::Offense));
        assert_ne!(color(Role::Offense), color(Role::Support));
        assert_ne!(color(Role::Tank), color(Role::Support));
    }
}

//! Single attempts of each navigation step.
//!
//! Every function here performs one try and reports the first page error it
//! hits; retry bounds and recovery between tries are applied by
//! [`crate::retry::retry_step`].

use std::time::Duration;

use bestdeal_core::RawProductRecord;

use crate::browser::{Locator, PageSession};
use crate::error::BrowserError;
use crate::recovery::RecoveryHandler;
use crate::retry::retry_step;
use crate::sites::SiteProfile;

/// Read-only inputs shared by every step of one session.
#[derive(Debug)]
pub(crate) struct StepContext {
    pub profile: &'static SiteProfile,
    pub recovery: RecoveryHandler,
    pub location: String,
    pub query: String,
    pub typing_pace: Duration,
    pub element_timeout: Duration,
}

impl StepContext {
    fn pace(&self) -> Duration {
        if self.profile.paced_typing {
            self.typing_pace
        } else {
            Duration::ZERO
        }
    }
}

/// Index of the first candidate containing `typed` (case-insensitive), else
/// the first candidate. `None` only when there are no candidates.
#[must_use]
pub(crate) fn best_match(candidates: &[String], typed: &str) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let needle = typed.trim().to_lowercase();
    let matched = if needle.is_empty() {
        None
    } else {
        candidates
            .iter()
            .position(|c| c.to_lowercase().contains(&needle))
    };
    Some(matched.unwrap_or(0))
}

/// Waits for `locator` and clicks its first match, retried under the
/// profile's click policy with overlay recovery between tries.
async fn click_when_ready(
    page: &mut dyn PageSession,
    ctx: &StepContext,
    locator: &'static Locator,
) -> Result<(), BrowserError> {
    let timeout = ctx.element_timeout;
    let run = retry_step(
        page,
        &ctx.recovery,
        ctx.profile.click,
        "click",
        move |page| {
            Box::pin(async move {
                page.wait_for(locator, timeout).await?;
                page.click(locator, 0).await
            })
        },
    )
    .await;
    if run.outcome.is_ok() {
        tracing::debug!(control = %locator, attempts = run.attempts, "clicked");
    }
    run.outcome
}

pub(crate) async fn load_page(
    page: &mut dyn PageSession,
    ctx: &StepContext,
) -> Result<(), BrowserError> {
    let profile = ctx.profile;
    page.goto(profile.url).await?;
    ctx.recovery.dismiss(page).await;

    let title = page.title().await?;
    if title
        .to_lowercase()
        .contains(&profile.title_keyword.to_lowercase())
    {
        Ok(())
    } else {
        Err(BrowserError::UnexpectedPage {
            title,
            expected: profile.title_keyword.to_owned(),
        })
    }
}

/// Opens the address picker, types the location, picks the best suggestion
/// and confirms it. Returns the text of the chosen suggestion.
pub(crate) async fn set_location(
    page: &mut dyn PageSession,
    ctx: &StepContext,
) -> Result<String, BrowserError> {
    let flow = &ctx.profile.location;
    ctx.recovery.dismiss(page).await;

    for control in flow.open {
        click_when_ready(page, ctx, control).await?;
        ctx.recovery.dismiss(page).await;
    }

    page.wait_for(&flow.input, ctx.element_timeout).await?;
    page.type_text(&flow.input, &ctx.location, ctx.pace()).await?;
    ctx.recovery.dismiss(page).await;

    let available = page.wait_for(&flow.suggestions, ctx.element_timeout).await?;
    let mut candidates = Vec::with_capacity(available);
    for index in 0..available {
        candidates.push(page.text(&flow.suggestions, index).await?.unwrap_or_default());
    }
    let chosen = best_match(&candidates, &ctx.location)
        .ok_or_else(|| BrowserError::ElementNotFound(flow.suggestions.to_string()))?;
    page.click(&flow.suggestions, chosen).await?;

    if let Some(confirm) = &flow.confirm {
        ctx.recovery.dismiss(page).await;
        click_when_ready(page, ctx, confirm).await?;
    }

    Ok(candidates.swap_remove(chosen))
}

pub(crate) async fn open_search(
    page: &mut dyn PageSession,
    ctx: &StepContext,
) -> Result<(), BrowserError> {
    let flow = &ctx.profile.search;
    ctx.recovery.dismiss(page).await;
    if let Some(open) = &flow.open {
        click_when_ready(page, ctx, open).await?;
    }
    page.wait_for(&flow.input, ctx.element_timeout).await?;
    Ok(())
}

pub(crate) async fn submit_query(
    page: &mut dyn PageSession,
    ctx: &StepContext,
) -> Result<(), BrowserError> {
    let input = &ctx.profile.search.input;
    ctx.recovery.dismiss(page).await;
    page.wait_for(input, ctx.element_timeout).await?;
    page.type_text(input, &ctx.query, ctx.pace()).await?;
    page.press_enter(input).await
}

/// One poll of the result grid. Zero cards is reported as an error so the
/// retry combinator keeps polling.
pub(crate) async fn count_results(
    page: &mut dyn PageSession,
    ctx: &StepContext,
) -> Result<usize, BrowserError> {
    let results = &ctx.profile.results;
    if let Some(scroll) = results.scroll {
        scroll_until_stable(page, scroll.max_rounds, scroll.pause).await?;
    }
    match page.count(&results.cards).await? {
        0 => Err(BrowserError::ElementNotFound(results.cards.to_string())),
        n => Ok(n),
    }
}

/// Scrolls to the bottom until the document height stops changing or
/// `max_rounds` scrolls have been made. Returns the number of scrolls.
pub(crate) async fn scroll_until_stable(
    page: &mut dyn PageSession,
    max_rounds: u32,
    pause: Duration,
) -> Result<u32, BrowserError> {
    let mut last_height = None;
    let mut rounds = 0;
    while rounds < max_rounds {
        let height = page.scroll_to_bottom().await?;
        rounds += 1;
        if last_height == Some(height) {
            break;
        }
        last_height = Some(height);
        tokio::time::sleep(pause).await;
    }
    Ok(rounds)
}

/// Reads every configured field of the `index`-th card.
///
/// Fields are independent: a missing element or a page error for one field
/// records an empty value for that field only.
pub(crate) async fn extract_card(
    page: &mut dyn PageSession,
    ctx: &StepContext,
    index: usize,
) -> RawProductRecord {
    let cards = &ctx.profile.results.cards;
    let mut record = RawProductRecord::new();
    for spec in ctx.profile.fields {
        let value = match page
            .child_value(cards, index, &spec.locator, spec.source)
            .await
        {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::debug!(card = index, field = %spec.field, error = %e, "field extraction failed");
                String::new()
            }
        };
        record.insert(spec.field, value);
    }
    record
}

//! The capability contract every page object implements, and the standard
//! sequence for opening one.

use std::future::Future;

use crate::error::SearchError;
use crate::fallback::FallbackOutcome;
use crate::step::{step, step_name};

/// A page of the site under test. Implementations hold their own driver
/// handle; nothing is shared through this trait.
pub trait Page {
    fn name(&self) -> &str;

    fn navigate(&self) -> impl Future<Output = Result<(), SearchError>> + Send;

    fn wait_ready(&self) -> impl Future<Output = Result<(), SearchError>> + Send;

    /// Dismisses the cookie-consent banner if one is shown.
    fn handle_consent(&self) -> impl Future<Output = FallbackOutcome> + Send;

    /// Accepts the adult-content disclaimer if one is shown.
    fn handle_disclaimer(&self) -> impl Future<Output = FallbackOutcome> + Send;
}

/// What happened to the interstitials while opening a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOpened {
    pub consent: FallbackOutcome,
    pub disclaimer: FallbackOutcome,
}

/// Navigates to `page`, clears its interstitials, and waits until it is ready.
///
/// Interstitial failures are logged and reported in [`PageOpened`] but do
/// not abort the flow.
///
/// # Errors
///
/// Returns the error from [`Page::navigate`] or [`Page::wait_ready`].
pub async fn open_page<P: Page>(page: &P) -> Result<PageOpened, SearchError> {
    let name = page.name();
    step(step_name("Open {page}", &[("page", &name)]), page.navigate()).await?;

    let consent = page.handle_consent().await;
    if consent.is_failed() {
        tracing::warn!(page = name, outcome = ?consent, "cookie consent banner could not be dismissed");
    }

    let disclaimer = page.handle_disclaimer().await;
    if disclaimer.is_failed() {
        tracing::warn!(page = name, outcome = ?disclaimer, "disclaimer could not be accepted");
    }

    step(
        step_name("Wait for {page} to be ready", &[("page", &name)]),
        page.wait_ready(),
    )
    .await?;

    Ok(PageOpened {
        consent,
        disclaimer,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::fallback::{run_fallbacks, Strategy, StrategyOutcome};

    struct FakePage {
        calls: Mutex<Vec<&'static str>>,
        banner_selectors_stale: bool,
        ready: bool,
    }

    impl FakePage {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                banner_selectors_stale: false,
                ready: true,
            }
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Page for FakePage {
        fn name(&self) -> &str {
            "home page"
        }

        async fn navigate(&self) -> Result<(), SearchError> {
            self.record("navigate");
            Ok(())
        }

        async fn wait_ready(&self) -> Result<(), SearchError> {
            self.record("wait_ready");
            if self.ready {
                Ok(())
            } else {
                Err(SearchError::Driver("results list never appeared".to_string()))
            }
        }

        async fn handle_consent(&self) -> FallbackOutcome {
            self.record("handle_consent");
            let stale = self.banner_selectors_stale;
            run_fallbacks(
                "dismiss cookie consent",
                vec![
                    Strategy::new("accept button", async move {
                        if stale {
                            StrategyOutcome::Failed("selector matched nothing clickable".to_string())
                        } else {
                            StrategyOutcome::Applied
                        }
                    }),
                    Strategy::new("iframe accept button", async { StrategyOutcome::NotApplicable }),
                ],
            )
            .await
        }

        async fn handle_disclaimer(&self) -> FallbackOutcome {
            self.record("handle_disclaimer");
            FallbackOutcome::NotApplicable
        }
    }

    #[tokio::test]
    async fn open_page_runs_phases_in_order() {
        let page = FakePage::new();
        let opened = open_page(&page).await.unwrap();
        assert_eq!(
            *page.calls.lock().unwrap(),
            vec!["navigate", "handle_consent", "handle_disclaimer", "wait_ready"]
        );
        assert!(matches!(opened.consent, FallbackOutcome::Applied { .. }));
        assert_eq!(opened.disclaimer, FallbackOutcome::NotApplicable);
    }

    #[tokio::test]
    async fn stale_consent_selectors_do_not_abort() {
        let mut page = FakePage::new();
        page.banner_selectors_stale = true;
        let opened = open_page(&page).await.unwrap();
        assert!(opened.consent.is_failed());
    }

    #[tokio::test]
    async fn readiness_failure_propagates() {
        let mut page = FakePage::new();
        page.ready = false;
        let err = open_page(&page).await.unwrap_err();
        assert!(matches!(err, SearchError::Driver(_)));
    }
}

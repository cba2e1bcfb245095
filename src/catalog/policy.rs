//! Category inclusion policy
//!
//! A total decision function over the three possible fates of an app
//! record under a category filter. Keeping it pure keeps the resolver's
//! branching out of the I/O path and makes the policy trivially testable.

/// Category that marks apps installed by default
pub const CATEGORY_DEFAULT: &str = "Default";

/// Category for backend/plugin packages hidden from the default view
pub const CATEGORY_DEFAULT_BACKEND: &str = "DefaultBackend";

/// What the category filter decides for one app record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDecision {
    /// Shown and pre-selected for install
    IncludeSelected,
    /// Shown, but not selected unless the user opts in
    IncludeUnselected,
    /// Not shown at all
    Exclude,
}

/// Decide an app record's fate under `category` given its tag set.
///
/// Under the `Default` filter, `Default`-tagged apps are pre-selected,
/// `DefaultBackend`-only apps are hidden entirely, and everything else is
/// shown unselected. Under any other filter, only apps carrying that exact
/// tag are shown, and those are pre-selected.
pub fn categorize(category: &str, tags: &[String]) -> CategoryDecision {
    let has = |tag: &str| tags.iter().any(|t| t == tag);

    if category == CATEGORY_DEFAULT {
        if has(CATEGORY_DEFAULT) {
            CategoryDecision::IncludeSelected
        } else if has(CATEGORY_DEFAULT_BACKEND) {
            CategoryDecision::Exclude
        } else {
            CategoryDecision::IncludeUnselected
        }
    } else if has(category) {
        CategoryDecision::IncludeSelected
    } else {
        CategoryDecision::Exclude
    }
}

//! Projection of the collection into what the UI shows.
//!
//! Everything here is a pure function of the link list and the current
//! filter, recomputed after every mutation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::storage::Link;

/// Menu entry that disables category filtering.
pub const ALL_CATEGORY: &str = "All";

/// Icon for categories missing from the table, in the category menu.
pub const MENU_FALLBACK_ICON: &str = "📦";
/// Icon for an unmapped active category in the list header.
pub const HEADER_FALLBACK_ICON: &str = "📂";
/// Icon for a link with neither an emoji nor a mapped category.
pub const LINK_FALLBACK_ICON: &str = "🔗";

/// Built-in categories and their icons. These always appear in the menu.
pub const BUILTIN_CATEGORIES: &[(&str, &str)] = &[
    ("Privacy & Security", "🔐"),
    ("Network", "🌐"),
    ("AI", "🧠"),
    ("Tools", "🧰"),
    ("Utilities", "⚙️"),
    ("Productivity", "🚀"),
    ("Personal", "👤"),
    ("Media", "🎥"),
    ("Streaming", "📺"),
    ("Anime", "🍥"),
    ("Games", "🎮"),
    ("Shopping", "🛒"),
    ("Banking / Finance", "💰"),
    ("Email", "✉️"),
    ("Storage", "☁️"),
    ("Hosting", "🛰️"),
    ("Google", "🟢"),
    ("Search", "🔎"),
    ("Social", "💬"),
    ("News", "🗞️"),
    ("Jobs", "🧑‍💼"),
    ("Android", "🤖"),
    ("Linux", "🐧"),
    ("Windows", "🪟"),
    ("Travel", "✈️"),
    ("Web apps", "🕸️"),
];

/// Icon registered for `category`, if any.
pub fn category_icon(category: &str) -> Option<&'static str> {
    if category == ALL_CATEGORY {
        return Some("🏠");
    }
    BUILTIN_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, icon)| *icon)
}

/// Icon drawn in front of a link: its emoji, else its category's icon.
pub fn link_icon(link: &Link) -> &str {
    match link.icon_kind() {
        crate::storage::LinkIcon::Emoji(emoji) => emoji,
        _ => category_icon(&link.category).unwrap_or(LINK_FALLBACK_ICON),
    }
}

/// Category ordering: case-insensitive, ties broken by byte order.
pub fn compare_categories(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// ============================================================================
// Filter
// ============================================================================

/// Which category the list is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Build from a menu entry name; "All" maps to [`CategoryFilter::All`].
    pub fn from_name(name: &str) -> Self {
        if name == ALL_CATEGORY {
            Self::All
        } else {
            Self::Only(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORY,
            Self::Only(name) => name,
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(name) => name == category,
        }
    }

    /// Icon for the list header.
    pub fn header_icon(&self) -> &'static str {
        category_icon(self.name()).unwrap_or(HEADER_FALLBACK_ICON)
    }
}

/// Search text plus category restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub query: String,
    pub category: CategoryFilter,
}

impl Filter {
    /// True if `link` passes both the search and the category restriction.
    ///
    /// The search is a case-insensitive substring match on title or URL.
    pub fn matches(&self, link: &Link) -> bool {
        self.category.matches(&link.category) && matches_query(link, &self.query.to_lowercase())
    }
}

fn matches_query(link: &Link, needle: &str) -> bool {
    needle.is_empty()
        || link.title.to_lowercase().contains(needle)
        || link.url.to_lowercase().contains(needle)
}

// ============================================================================
// Grouping
// ============================================================================

/// Links of one category, sorted by title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGroup<'a> {
    pub category: &'a str,
    /// Position in the collection paired with the link.
    pub entries: Vec<(usize, &'a Link)>,
}

impl<'a> LinkGroup<'a> {
    pub fn links(&self) -> impl Iterator<Item = &'a Link> + '_ {
        self.entries.iter().map(|(_, link)| *link)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Filter, group by category, and sort.
///
/// Groups are ordered by [`compare_categories`]; links within a group by
/// title, case-insensitively, keeping collection order for equal titles.
pub fn project<'a>(links: &'a [Link], filter: &Filter) -> Vec<LinkGroup<'a>> {
    let needle = filter.query.to_lowercase();
    let mut groups: BTreeMap<(String, &'a str), Vec<(usize, &'a Link)>> = BTreeMap::new();

    for (index, link) in links.iter().enumerate() {
        if !filter.category.matches(&link.category) || !matches_query(link, &needle) {
            continue;
        }
        groups
            .entry((link.category.to_lowercase(), link.category.as_str()))
            .or_default()
            .push((index, link));
    }

    groups
        .into_iter()
        .map(|((_, category), mut entries)| {
            entries.sort_by_cached_key(|(_, link)| link.title.to_lowercase());
            LinkGroup { category, entries }
        })
        .collect()
}

/// One selectable line of the link list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRow {
    Header {
        category: String,
        count: usize,
        collapsed: bool,
    },
    /// A link, by position in the collection.
    Link { index: usize },
}

/// Flatten groups into display rows, hiding the links of collapsed groups.
pub fn rows(groups: &[LinkGroup<'_>], collapsed: &HashSet<String>) -> Vec<ViewRow> {
    let mut rows = Vec::new();
    for group in groups {
        let is_collapsed = collapsed.contains(group.category);
        rows.push(ViewRow::Header {
            category: group.category.to_string(),
            count: group.len(),
            collapsed: is_collapsed,
        });
        if !is_collapsed {
            rows.extend(group.entries.iter().map(|(index, _)| ViewRow::Link { index: *index }));
        }
    }
    rows
}

// ============================================================================
// Category Menu
// ============================================================================

/// One line of the category picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub count: usize,
    pub icon: &'static str,
}

/// "All" with the collection size, then every built-in or used category in
/// sorted order with its link count.
pub fn category_menu(stats: &BTreeMap<String, usize>, total: usize) -> Vec<CategoryEntry> {
    let mut names: Vec<&str> = BUILTIN_CATEGORIES.iter().map(|(name, _)| *name).collect();
    for name in stats.keys() {
        if !names.contains(&name.as_str()) {
            names.push(name.as_str());
        }
    }
    names.sort_by(|a, b| compare_categories(a, b));

    let mut menu = Vec::with_capacity(names.len() + 1);
    menu.push(CategoryEntry {
        name: ALL_CATEGORY.to_string(),
        count: total,
        icon: category_icon(ALL_CATEGORY).unwrap_or(MENU_FALLBACK_ICON),
    });
    menu.extend(names.into_iter().map(|name| CategoryEntry {
        name: name.to_string(),
        count: stats.get(name).copied().unwrap_or(0),
        icon: category_icon(name).unwrap_or(MENU_FALLBACK_ICON),
    }));
    menu
}

/// Suggestions for the form's category field: used categories first
/// (most links first), then the remaining built-ins.
pub fn category_suggestions(stats: &BTreeMap<String, usize>) -> Vec<String> {
    let mut used: Vec<(&String, &usize)> = stats.iter().collect();
    used.sort_by(|a, b| b.1.cmp(a.1).then_with(|| compare_categories(a.0, b.0)));

    let mut out: Vec<String> = used.into_iter().map(|(name, _)| name.clone()).collect();
    for (name, _) in BUILTIN_CATEGORIES {
        if !stats.contains_key(*name) {
            out.push((*name).to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn link(title: &str, url: &str, category: &str) -> Link {
        let mut l: Link = serde_json::from_value(serde_json::json!({
            "id": format!("id-{title}"),
            "title": title,
            "url": url,
            "category": category,
        }))
        .unwrap();
        l.normalize();
        l
    }

    fn titles(group: &LinkGroup<'_>) -> Vec<String> {
        group.links().map(|l| l.title.clone()).collect()
    }

    fn sample() -> Vec<Link> {
        vec![
            link("A", "http://a", "Tools"),
            link("B", "http://b", "Tools"),
        ]
    }

    #[test]
    fn test_search_matches_title_case_insensitively() {
        let links = sample();
        let filter = Filter {
            query: "a".to_string(),
            category: CategoryFilter::All,
        };
        let groups = project(&links, &filter);
        assert_eq!(groups.len(), 1);
        assert_eq!(titles(&groups[0]), vec!["A"]);
    }

    #[test]
    fn test_search_matches_url() {
        let links = vec![link("Docs", "https://DOCS.rs", "Tools")];
        let filter = Filter {
            query: "docs.RS".to_string(),
            ..Default::default()
        };
        assert_eq!(project(&links, &filter).len(), 1);
    }

    #[test]
    fn test_category_filter_exact() {
        let mut links = sample();
        links.push(link("C", "http://c", "tools"));
        let filter = Filter {
            query: String::new(),
            category: CategoryFilter::Only("Tools".to_string()),
        };
        let groups = project(&links, &filter);
        assert_eq!(groups.len(), 1);
        assert_eq!(titles(&groups[0]), vec!["A", "B"]);
    }

    #[test]
    fn test_groups_and_titles_sorted() {
        let links = vec![
            link("zeta", "http://z", "news"),
            link("Alpha", "http://a", "AI"),
            link("beta", "http://b", "News"),
            link("Gamma", "http://g", "News"),
            link("alpha", "http://a2", "News"),
        ];
        let groups = project(&links, &Filter::default());
        let categories: Vec<&str> = groups.iter().map(|g| g.category).collect();
        assert_eq!(categories, vec!["AI", "News", "news"]);
        assert_eq!(titles(&groups[1]), vec!["alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_equal_titles_keep_collection_order() {
        let links = vec![
            link("Same", "http://1", "Tools"),
            link("same", "http://2", "Tools"),
        ];
        let groups = project(&links, &Filter::default());
        let urls: Vec<&str> = groups[0].links().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["http://1", "http://2"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let links = sample();
        let filter = Filter {
            query: "nothing".to_string(),
            ..Default::default()
        };
        assert!(project(&links, &filter).is_empty());
    }

    #[test]
    fn test_rows_hide_collapsed_links() {
        let links = vec![
            link("A", "http://a", "AI"),
            link("T", "http://t", "Tools"),
        ];
        let groups = project(&links, &Filter::default());
        let collapsed: HashSet<String> = ["AI".to_string()].into_iter().collect();
        assert_eq!(
            rows(&groups, &collapsed),
            vec![
                ViewRow::Header {
                    category: "AI".to_string(),
                    count: 1,
                    collapsed: true
                },
                ViewRow::Header {
                    category: "Tools".to_string(),
                    count: 1,
                    collapsed: false
                },
                ViewRow::Link { index: 1 },
            ]
        );
    }

    #[test]
    fn test_category_menu_counts() {
        let mut stats = BTreeMap::new();
        stats.insert("Tools".to_string(), 2);
        stats.insert("Homelab".to_string(), 1);
        let menu = category_menu(&stats, 3);

        assert_eq!(menu[0].name, "All");
        assert_eq!(menu[0].count, 3);
        assert_eq!(menu[0].icon, "🏠");

        let tools = menu.iter().find(|e| e.name == "Tools").unwrap();
        assert_eq!((tools.count, tools.icon), (2, "🧰"));
        let homelab = menu.iter().find(|e| e.name == "Homelab").unwrap();
        assert_eq!(homelab.icon, MENU_FALLBACK_ICON);
        let games = menu.iter().find(|e| e.name == "Games").unwrap();
        assert_eq!(games.count, 0);

        let names: Vec<&str> = menu[1..].iter().map(|e| e.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_by(|a, b| compare_categories(a, b));
        assert_eq!(names, sorted);
        assert_eq!(menu.len(), BUILTIN_CATEGORIES.len() + 2);
    }

    #[test]
    fn test_icons() {
        let mut l = link("A", "http://a", "AI");
        assert_eq!(link_icon(&l), "🧠");
        l.icon = Some("⭐".to_string());
        assert_eq!(link_icon(&l), "⭐");
        l.icon = Some("https://a/icon.png".to_string());
        l.category = "Unknown".to_string();
        assert_eq!(link_icon(&l), LINK_FALLBACK_ICON);
        assert_eq!(
            CategoryFilter::Only("Unknown".to_string()).header_icon(),
            HEADER_FALLBACK_ICON
        );
        assert_eq!(CategoryFilter::All.header_icon(), "🏠");
    }

    #[test]
    fn test_category_suggestions_order() {
        let mut stats = BTreeMap::new();
        stats.insert("Tools".to_string(), 1);
        stats.insert("Homelab".to_string(), 3);
        let suggestions = category_suggestions(&stats);
        assert_eq!(&suggestions[..2], &["Homelab".to_string(), "Tools".to_string()]);
        assert_eq!(
            suggestions.iter().filter(|s| s.as_str() == "Tools").count(),
            1
        );
    }
}

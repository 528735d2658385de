//! Group discovery from the site navigation menu.
//!
//! The home page carries a nested menu:
//!
//! ```text
//! #nav
//! └── li  "Specifications Groups"
//!     └── ul
//!         └── li  "TSG RAN"            (label contains "tsg", not "close")
//!             └── ul
//!                 └── li  "RAN1 - Radio Layer 1"   → group "ran1"
//!                     └── ul
//!                         └── li "Meetings"
//!                             └── ul
//!                                 └── li "Full list" → href
//! ```
//!
//! Any branch that does not have this shape is skipped; only a missing `#nav`
//! container is an error.

use crate::config::NAV_ID;
use crate::error::{CatalogError, Result};
use crate::models::Group;
use crate::scrapers::node::PageNode;
use crate::scrapers::{dedup, element_by_id};
use scraper::Html;
use tracing::{debug, info, instrument};
use url::Url;

/// Parse the home page and return every open group with a full meeting list.
///
/// # Arguments
///
/// * `html` - Home page text
/// * `base_url` - Site root the relative menu links are resolved against
///
/// # Errors
///
/// [`CatalogError::PageFormat`] when the navigation container is missing.
#[instrument(level = "info", skip_all, fields(base_url = %base_url))]
pub fn discover_groups(html: &str, base_url: &Url) -> Result<Vec<Group>> {
    let document = Html::parse_document(html);
    let nav = element_by_id(&document, NAV_ID).ok_or_else(|| {
        CatalogError::page_format(base_url.as_str(), format!("missing #{NAV_ID} container"))
    })?;
    let groups = groups_from_nav(nav, base_url);
    info!(count = groups.len(), "Discovered groups");
    Ok(groups)
}

/// Walk the navigation container. Generic over the node type so the
/// traversal does not depend on the parser.
pub fn groups_from_nav<'a, N: PageNode<'a>>(nav: N, base_url: &Url) -> Vec<Group> {
    let mut groups = Vec::new();
    for top_item in nav.children() {
        let Some(label) = top_item.link_label() else {
            continue;
        };
        debug!(%label, "Found top-level menu item");
        if label.contains("About") {
            continue;
        }
        if !label.to_lowercase().contains("groups") {
            continue;
        }
        if let Some(submenu) = top_item.first_named("ul") {
            groups.extend(groups_from_submenu(submenu, base_url));
        }
    }
    dedup(groups)
}

/// Open TSG branches of the "Groups" submenu.
fn groups_from_submenu<'a, N: PageNode<'a>>(submenu: N, base_url: &Url) -> Vec<Group> {
    let mut groups = Vec::new();
    for item in submenu.children() {
        let Some(label) = item.link_label() else {
            continue;
        };
        let name = label.to_lowercase().replace(' ', "_");
        if !name.contains("tsg") || name.contains("close") {
            continue;
        }
        debug!(%name, "Walking group submenu");
        if let Some(branch) = item.first_named("ul") {
            groups.extend(groups_from_tsg(branch, base_url));
        }
    }
    groups
}

/// Working groups of a single TSG branch.
fn groups_from_tsg<'a, N: PageNode<'a>>(branch: N, base_url: &Url) -> Vec<Group> {
    let mut groups = Vec::new();
    for item in branch.children() {
        let Some(label) = item.link_label() else {
            continue;
        };
        let Some(group_name) = group_name_from_label(&label) else {
            continue;
        };
        let Some(details) = item.first_named("ul") else {
            continue;
        };
        for href in full_list_targets(details) {
            match base_url.join(href) {
                Ok(url) => {
                    debug!(%group_name, %url, "Found full meeting list");
                    groups.push(Group {
                        name: group_name.clone(),
                        url: url.to_string(),
                    });
                }
                Err(e) => debug!(%group_name, href, error = %e, "Unresolvable menu link"),
            }
        }
    }
    groups
}

/// `"RAN1 - Radio Layer 1"` → `ran1`, `"RAN Plenary"` → `ran-plenary`.
/// Other shapes are not groups.
pub fn group_name_from_label(label: &str) -> Option<String> {
    let label = label.trim().to_lowercase();
    let name = if let Some((head, _)) = label.split_once('-') {
        head.trim().to_string()
    } else if label.contains("plenary") {
        label
    } else {
        return None;
    };
    if name.is_empty() {
        return None;
    }
    Some(name.replace(' ', "-"))
}

/// `href`s of "full" entries under the "meetings" item of a group.
fn full_list_targets<'a, N: PageNode<'a>>(details: N) -> Vec<&'a str> {
    let mut targets = Vec::new();
    for item in details.children() {
        let is_meetings = item
            .link_label()
            .is_some_and(|l| l.to_lowercase().contains("meetings"));
        if !is_meetings {
            continue;
        }
        let Some(list) = item.first_named("ul") else {
            debug!("Meetings item without nested list");
            continue;
        };
        for entry in list.children() {
            let is_full = entry
                .link_label()
                .is_some_and(|l| l.to_lowercase().contains("full"));
            if let (true, Some(href)) = (is_full, entry.first_link_target()) {
                targets.push(href);
            }
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = r##"
<html><body>
<ul id="nav">
  <li><a href="/about">About 3GPP</a><ul><li><a href="/x">TSG fake - 1</a></li></ul></li>
  <li><a href="/groups">Specifications Groups</a>
    <ul>
      <li><a href="/ran">TSG RAN</a>
        <ul>
          <li><a href="/ran/plenary">RAN Plenary</a>
            <ul>
              <li><a href="#">Meetings</a>
                <ul><li><a href="/DynaReport/Meetings-RP.htm">Full list</a></li></ul>
              </li>
            </ul>
          </li>
          <li><a href="/ran1">RAN1 - Radio Layer 1</a>
            <ul>
              <li><a href="/ran1/home">Home</a></li>
              <li><a href="#">Meetings</a>
                <ul>
                  <li><a href="/DynaReport/Meetings-R1.htm">Full list</a></li>
                  <li><a href="/DynaReport/Meetings-R1.htm">Full list</a></li>
                  <li><a href="/next">Next meeting</a></li>
                </ul>
              </li>
            </ul>
          </li>
          <li><a href="/ran2">RAN2 - Radio Layer 2</a>
            <ul><li><a href="#">Meetings</a></li></ul>
          </li>
          <li><a href="/odd">Odd item</a><ul><li><a href="#">Meetings</a><ul><li><a href="/f">Full</a></li></ul></li></ul></li>
        </ul>
      </li>
      <li><a href="/closed">TSG GERAN (closed)</a>
        <ul>
          <li><a href="/g1">GERAN1 - Radio</a>
            <ul><li><a href="#">Meetings</a><ul><li><a href="/g1full">Full list</a></li></ul></li></ul>
          </li>
        </ul>
      </li>
    </ul>
  </li>
</ul>
</body></html>"##;

    fn base() -> Url {
        Url::parse("http://www.3gpp.org").unwrap()
    }

    #[test]
    fn test_discovers_open_groups_with_absolute_urls() {
        let groups = discover_groups(HOME, &base()).unwrap();
        assert_eq!(
            groups,
            vec![
                Group {
                    name: "ran-plenary".to_string(),
                    url: "http://www.3gpp.org/DynaReport/Meetings-RP.htm".to_string(),
                },
                Group {
                    name: "ran1".to_string(),
                    url: "http://www.3gpp.org/DynaReport/Meetings-R1.htm".to_string(),
                },
            ]
        );
        assert!(groups.iter().all(|g| g.url.starts_with("http://www.3gpp.org/")));
    }

    #[test]
    fn test_missing_nav_is_page_format_error() {
        let err = discover_groups("<html><body><p>maintenance</p></body></html>", &base())
            .unwrap_err();
        assert!(matches!(err, CatalogError::PageFormat { .. }));
    }

    #[test]
    fn test_nav_without_groups_menu_is_empty_not_error() {
        let html = r#"<ul id="nav"><li><a href="/about">About</a></li></ul>"#;
        assert!(discover_groups(html, &base()).unwrap().is_empty());
    }

    #[test]
    fn test_group_name_from_label() {
        assert_eq!(group_name_from_label("RAN1 - Radio Layer 1").as_deref(), Some("ran1"));
        assert_eq!(group_name_from_label("CT Plenary").as_deref(), Some("ct-plenary"));
        assert_eq!(group_name_from_label("Working groups"), None);
        assert_eq!(group_name_from_label(" - leading dash"), None);
    }
}

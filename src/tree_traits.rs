//! Render displayed header trees with termtree.

use termtree::Tree;
use tracing::instrument;

use crate::application::services::{HeaderService, Section};
use crate::config::DisplayConfig;
use crate::domain::DisplayItem;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

/// One header section as seen by the renderer.
pub struct SectionView<'a> {
    service: &'a HeaderService,
    section: Section,
    display: &'a DisplayConfig,
}

impl<'a> SectionView<'a> {
    pub fn new(service: &'a HeaderService, section: Section, display: &'a DisplayConfig) -> Self {
        Self {
            service,
            section,
            display,
        }
    }

    fn item_label(&self, item: &DisplayItem) -> String {
        match item {
            DisplayItem::Column(id) => self
                .service
                .tree()
                .column(id)
                .map(|c| c.display_name().to_string())
                .unwrap_or_else(|| id.to_string()),
            DisplayItem::Group(handle) => {
                let Some(group) = self.service.group(*handle) else {
                    return format!("<stale {}>", handle);
                };
                let mut label = self
                    .service
                    .tree()
                    .group(group.provided())
                    .map(|g| g.display_name().to_string())
                    .unwrap_or_else(|| group.group_key().to_string());
                if group.is_padding() {
                    label = format!("({})", label);
                }
                if self.display.show_instance_ids {
                    label.push_str(&format!(" [{}]", group.unique_id()));
                }
                label
            }
        }
    }

    fn item_tree(&self, item: &DisplayItem) -> Tree<String> {
        let mut node = Tree::new(self.item_label(item));
        if let DisplayItem::Group(handle) = item {
            if let Some(group) = self.service.group(*handle) {
                for child in group.children() {
                    node.push(self.item_tree(child));
                }
            }
        }
        node
    }
}

impl TreeNodeConvert for SectionView<'_> {
    #[instrument(level = "trace", skip(self), fields(section = %self.section))]
    fn to_tree_string(&self) -> Tree<String> {
        let title = match self.section.pinned() {
            Some(side) if self.display.show_pinned => format!("{} (pinned {})", self.section, side),
            _ => self.section.to_string(),
        };
        let leaves: Vec<_> = self
            .service
            .roots(self.section)
            .iter()
            .map(|item| self.item_tree(item))
            .collect();
        Tree::new(title).with_leaves(leaves)
    }
}

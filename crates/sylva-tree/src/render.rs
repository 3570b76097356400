//! Human-readable rendering of a fitted tree.
//!
//! ```text
//! outlook = sunny
//! |  humidity <= 70: yes (2.0)
//! |  humidity > 70: no (3.0)
//! outlook = overcast: yes (4.0)
//! outlook = rainy: yes (5.0/2.0)
//! ```
//!
//! Each branch line names the tested attribute and branch value. A leaf
//! shows its label and record count, plus the misclassified count when it is
//! non-zero; a leaf no record reached shows `null`.

use std::fmt;

use crate::node::Node;
use crate::split::SplitRule;
use crate::tree::DecisionTree;

const INDENT: &str = "|  ";

impl DecisionTree {
    fn write_leaf(&self, f: &mut fmt::Formatter<'_>, node: &Node) -> fmt::Result {
        let Node::Leaf {
            label,
            class_counts,
            ..
        } = node
        else {
            return Ok(());
        };
        let Some(label) = *label else {
            return writeln!(f, ": null");
        };
        let name = self.class_name(label).unwrap_or("?");
        let total: usize = class_counts.iter().sum();
        let wrong = total - class_counts[label];
        if wrong > 0 {
            writeln!(f, ": {name} ({:.1}/{:.1})", total as f64, wrong as f64)
        } else {
            writeln!(f, ": {name} ({:.1})", total as f64)
        }
    }

    fn write_branch(
        &self,
        f: &mut fmt::Formatter<'_>,
        rule: &SplitRule,
        branch: usize,
    ) -> fmt::Result {
        let attribute = self.schema.attribute(rule.attribute());
        let name = attribute.map_or("?", |a| a.name());
        match *rule {
            SplitRule::Multiway { .. } => {
                let value = attribute.and_then(|a| a.category(branch)).unwrap_or("?");
                write!(f, "{name} = {value}")
            }
            SplitRule::Threshold { threshold, .. } => {
                let op = if branch == 0 { "<=" } else { ">" };
                write!(f, "{name} {op} {threshold}")
            }
        }
    }
}

impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!(
            "Decision tree ({}{})",
            self.criterion,
            if self.pruned { ", pruned" } else { "" }
        );
        writeln!(f, "{title}")?;
        writeln!(f, "{}", "-".repeat(title.len()))?;
        writeln!(f)?;

        let root = self.root();
        if root.is_leaf() {
            self.write_leaf(f, root)?;
        } else {
            // (decision node, branch, depth), popped in branch order.
            let mut stack = vec![(0usize, 0usize, 0usize)];
            while let Some((idx, branch, level)) = stack.pop() {
                let Node::Decision { rule, children, .. } = &self.nodes[idx] else {
                    continue;
                };
                if branch + 1 < children.len() {
                    stack.push((idx, branch + 1, level));
                }
                write!(f, "{}", INDENT.repeat(level))?;
                self.write_branch(f, rule, branch)?;
                let child = &self.nodes[children[branch].index()];
                if child.is_leaf() {
                    self.write_leaf(f, child)?;
                } else {
                    writeln!(f)?;
                    stack.push((children[branch].index(), 0, level + 1));
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Number of leaves: {}", self.n_leaves())?;
        write!(f, "Size of the tree: {}", self.n_nodes())
    }
}

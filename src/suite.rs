//! Scenario-suite helper: flatten arbitrarily nested groups of named cases
//! into leaves and select them by case-insensitive substring match on their
//! dotted identifier.

/// A node in a scenario suite: either a leaf case carrying a payload, or a
/// named group of child nodes.
pub enum Node<T> {
    Case { id: String, item: T },
    Group { id: String, children: Vec<Node<T>> },
}

impl<T> Node<T> {
    pub fn case(id: impl Into<String>, item: T) -> Self {
        Node::Case {
            id: id.into(),
            item,
        }
    }

    pub fn group(id: impl Into<String>, children: Vec<Node<T>>) -> Self {
        Node::Group {
            id: id.into(),
            children,
        }
    }

    fn id(&self) -> &str {
        match self {
            Node::Case { id, .. } | Node::Group { id, .. } => id,
        }
    }

    /// All leaf cases, identified by their dotted path from this node.
    pub fn leaves(&self) -> Vec<(String, &T)> {
        let mut out = Vec::new();
        self.collect(None, &mut out);
        out
    }

    fn collect<'a>(&'a self, prefix: Option<&str>, out: &mut Vec<(String, &'a T)>) {
        let id = match prefix {
            Some(p) => format!("{}.{}", p, self.id()),
            None => self.id().to_string(),
        };
        match self {
            Node::Case { item, .. } => out.push((id, item)),
            Node::Group { children, .. } => {
                for child in children {
                    child.collect(Some(&id), out);
                }
            }
        }
    }

    /// Leaf cases whose dotted identifier contains `pattern`,
    /// case-insensitively.
    pub fn select(&self, pattern: &str) -> Vec<(String, &T)> {
        let needle = pattern.to_lowercase();
        self.leaves()
            .into_iter()
            .filter(|(id, _)| id.to_lowercase().contains(&needle))
            .collect()
    }
}

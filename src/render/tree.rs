use std::fmt;

/// A labelled node with ordered children, drawn with box connectors.
///
/// ```text
/// root
/// ├── Headers:
/// │   └── Accept: */*
/// └── Body: 5 B of text/plain
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub label: String,
    pub children: Vec<Tree>,
}

impl Tree {
    pub fn new(label: impl Into<String>) -> Self {
        Tree { label: label.into(), children: Vec::new() }
    }

    /// Adds a child and returns `self` for chaining.
    pub fn child(mut self, node: impl Into<Tree>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn push(&mut self, node: impl Into<Tree>) {
        self.children.push(node.into());
    }

    fn draw(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            let (connector, indent) = if i == last { ("└── ", "    ") } else { ("├── ", "│   ") };
            writeln!(f, "{prefix}{connector}{}", child.label)?;
            child.draw(f, &format!("{prefix}{indent}"))?;
        }
        Ok(())
    }
}

impl From<&str> for Tree {
    fn from(label: &str) -> Self {
        Tree::new(label)
    }
}

impl From<String> for Tree {
    fn from(label: String) -> Self {
        Tree::new(label)
    }
}

/// Multi-line rendering; every line ends with `\n`.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label)?;
        self.draw(f, "")
    }
}

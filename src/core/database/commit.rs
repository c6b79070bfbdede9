// src/core/database/commit.rs with clone_box implementation
use super::{author::Author, database::GitObject};
use crate::errors::error::Error;
use std::any::Any;
use std::str;

#[derive(Debug, Clone)]
pub struct Commit {
    pub oid: Option<String>,
    pub parents: Vec<String>,
    pub tree: String,
    pub author: Author,
    pub committer: Author,
    pub message: String,
}

impl GitObject for Commit {
    fn get_type(&self) -> &str {
        "commit"
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.serialize()
    }

    fn set_oid(&mut self, oid: String) {
        self.oid = Some(oid);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    // Implementation of clone_box to properly clone the object
    fn clone_box(&self) -> Box<dyn GitObject> {
        Box::new(self.clone())
    }
}

impl Commit {
    /// Single-parent constructor, kept for commands that only ever create
    /// ordinary (non-merge) commits.
    pub fn new(parent: Option<String>, tree: String, author: Author, message: String) -> Self {
        Self::new_with_parents(parent.into_iter().collect(), tree, author, message)
    }

    pub fn new_with_parents(
        parents: Vec<String>,
        tree: String,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            oid: None,
            parents,
            tree,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    pub fn new_with_committer(
        parent: Option<String>,
        tree: String,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        Commit {
            oid: None,
            parents: parent.into_iter().collect(),
            tree,
            author,
            committer,
            message,
        }
    }

    pub fn title_line(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    /// First parent, for callers that only care about the linear ancestor.
    pub fn get_parent(&self) -> Option<&String> {
        self.parents.first()
    }

    pub fn get_parents(&self) -> &[String] {
        &self.parents
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn get_author(&self) -> Option<&Author> {
        Some(&self.author)
    }

    pub fn get_committer(&self) -> Option<&Author> {
        Some(&self.committer)
    }

    pub fn get_message(&self) -> &str {
        &self.message
    }

    pub fn get_oid(&self) -> Option<&String> {
        self.oid.as_ref()
    }

    pub fn get_tree(&self) -> &str {
        &self.tree
    }

    fn serialize(&self) -> Vec<u8> {
        let author_timestamp = self.author.timestamp.timestamp();
        let author_line = format!(
            "{} <{}> {} +0000",
            self.author.name, self.author.email, author_timestamp
        );

        let committer_timestamp = self.committer.timestamp.timestamp();
        let committer_line = format!(
            "{} <{}> {} +0000",
            self.committer.name, self.committer.email, committer_timestamp
        );

        let mut lines = Vec::with_capacity(5 + self.parents.len());

        lines.push(format!("tree {}", self.tree));

        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }

        lines.push(format!("author {}", author_line));
        lines.push(format!("committer {}", committer_line));

        lines.push(String::new()); // Empty line before message
        lines.push(self.message.clone());

        lines.join("\n").into_bytes()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize()
    }

    /// Parses a commit from its serialized object body. Header lines are
    /// read in order so that repeated `parent` lines (merge commits) are all
    /// collected, rather than the single value a plain header map would keep.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        let content = match str::from_utf8(data) {
            Ok(s) => s,
            Err(_) => return Err(Error::Generic("Invalid UTF-8 in commit".to_string())),
        };

        let mut lines = content.lines();
        let mut tree: Option<String> = None;
        let mut parents = Vec::new();
        let mut author_str: Option<String> = None;
        let mut committer_str: Option<String> = None;
        let mut message = String::new();
        let mut reading_message = false;

        while let Some(line) = lines.next() {
            if reading_message {
                if !message.is_empty() {
                    message.push('\n');
                }
                message.push_str(line);
                continue;
            }

            if line.is_empty() {
                reading_message = true;
                continue;
            }

            let parts: Vec<&str> = line.splitn(2, ' ').collect();
            if parts.len() != 2 {
                return Err(Error::Generic(format!("Invalid commit header: {}", line)));
            }

            match parts[0] {
                "tree" => tree = Some(parts[1].to_string()),
                "parent" => parents.push(parts[1].to_string()),
                "author" => author_str = Some(parts[1].to_string()),
                "committer" => committer_str = Some(parts[1].to_string()),
                _ => {} // forward-compatible: ignore unknown headers
            }
        }

        let tree = tree.ok_or_else(|| Error::Generic("Missing tree in commit".to_string()))?;
        let author_str =
            author_str.ok_or_else(|| Error::Generic("Missing author in commit".to_string()))?;
        let committer_str = committer_str.unwrap_or_else(|| author_str.clone());

        let author = Author::parse(&author_str)
            .map_err(|_| Error::Generic("Invalid author format".to_string()))?;
        let committer = Author::parse(&committer_str).unwrap_or_else(|_| author.clone());

        Ok(Commit {
            oid: None,
            parents,
            tree,
            author,
            committer,
            message,
        })
    }
}

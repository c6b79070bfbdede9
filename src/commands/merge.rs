// src/commands/merge.rs
use std::env;
use std::path::{Path, PathBuf};
use std::collections::{HashMap, HashSet};

use crate::errors::error::Error;
use crate::core::merge::inputs::Inputs;
use crate::core::merge::ort::config::MergeConfig;
use crate::core::merge::ort::driver;
use crate::core::merge::ort::index_materializer::materialize_conflicts;
use crate::core::refs::Refs;
use crate::core::database::database::Database;
use crate::core::database::database::GitObject;
use crate::core::database::commit::Commit;
use crate::core::database::author::Author;
use crate::core::path_filter::PathFilter;
use crate::core::workspace::Workspace;
use crate::core::database::tree::{Tree, TreeEntry};
use crate::core::file_mode::FileMode;
use crate::core::repository::repository::Repository;
use crate::core::repository::pending_commit::{PendingCommit, PendingCommitType};

pub struct MergeCommand;

impl MergeCommand {
    pub fn execute(revision: &str, message: Option<&str>) -> Result<(), Error> {
        let root_path = Path::new(".");
        let git_path = root_path.join(".ash");

        if !git_path.exists() {
            return Err(Error::Generic(
                "Not an ash repository (or any of the parent directories): .ash directory not found".into(),
            ));
        }

        let mut repo = Repository::new(".")?;

        if !repo.index.load_for_update()? {
            return Err(Error::Lock("Failed to acquire lock on index".to_string()));
        }

        let result = Self::merge(&mut repo, revision, message);

        if let Err(ref e) = result {
            let msg = e.to_string();
            if msg == "Already up to date." {
                repo.index.rollback()?;
                return Ok(());
            }
            if !msg.contains("fix conflicts") && !msg.contains("Automatic merge failed") {
                repo.index.rollback()?;
            }
        }

        result
    }

    fn merge(repo: &mut Repository, revision: &str, message: Option<&str>) -> Result<(), Error> {
        if repo.index.has_conflict() {
            return Err(Error::Generic(
                "Cannot merge with conflicts. Fix conflicts and commit first.".into(),
            ));
        }

        let head_oid = match repo.refs.read_head()? {
            Some(oid) => oid,
            None => return Err(Error::Generic("No HEAD commit found. Create an initial commit first.".into())),
        };

        let inputs = Inputs::new(&mut repo.database, &repo.refs, "HEAD".to_string(), revision.to_string())?;

        if inputs.already_merged() {
            tracing::info!("already up to date");
            return Err(Error::Generic("Already up to date.".into()));
        }

        if inputs.is_fast_forward() {
            tracing::info!(from = %head_oid, to = %inputs.right_oid, "fast-forward possible");
            return Self::handle_fast_forward(
                &mut repo.database,
                &repo.workspace,
                &mut repo.index,
                &repo.refs,
                &inputs.left_oid,
                &inputs.right_oid,
            );
        }

        tracing::info!(base = ?inputs.base_oids, left = %inputs.left_oid, right = %inputs.right_oid, "performing recursive merge");

        let head_commit = repo.database.load(&inputs.left_oid)?;
        let head_tree_oid = head_commit
            .as_any()
            .downcast_ref::<Commit>()
            .ok_or_else(|| Error::Generic(format!("{} is not a commit", inputs.left_oid)))?
            .get_tree()
            .to_string();

        let mut config = MergeConfig::new(inputs.left_name.clone(), inputs.right_name.clone());
        let merge_result = driver::merge_commits(
            &mut repo.database,
            &inputs.base_oids,
            &inputs.left_oid,
            &inputs.right_oid,
            &mut config,
        )?;

        let path_filter = PathFilter::new();
        let tree_diff = repo
            .database
            .tree_diff(Some(head_tree_oid.as_str()), Some(merge_result.tree_oid.as_str()), &path_filter)?;
        if !tree_diff.is_empty() {
            let mut migration = repo.migration(tree_diff);
            migration.apply_changes()?;
        }

        materialize_conflicts(&merge_result.session, &mut repo.index);

        if !merge_result.clean {
            for (path, note) in driver::render_messages(&merge_result) {
                println!("CONFLICT: {}", note);
                tracing::debug!(%path, %note, "conflict message");
            }

            repo.index.write_updates()?;

            let pending_commit = PendingCommit::new(&repo.path.join(".ash"));
            pending_commit.start(&inputs.right_oid, PendingCommitType::Merge)?;

            let commit_message = message.map(|s| s.to_string()).unwrap_or_else(|| {
                format!("Merge branch '{}' into {}", revision, inputs.left_name)
            });
            std::fs::write(&pending_commit.message_path, commit_message)?;

            return Err(Error::Generic(
                "Automatic merge failed; fix conflicts and then commit the result.".into(),
            ));
        }

        repo.index.write_updates()?;

        let commit_message = message.map(|s| s.to_string()).unwrap_or_else(|| {
            format!("Merge branch '{}' into {}", revision, inputs.left_name)
        });
        let author = Self::current_author();

        let mut commit = Commit::new_with_parents(
            vec![head_oid.clone(), inputs.right_oid.clone()],
            merge_result.tree_oid.clone(),
            author,
            commit_message,
        );
        repo.database.store(&mut commit)?;
        let commit_oid = commit.get_oid().cloned().ok_or_else(|| Error::Generic("Commit OID not set after storage".into()))?;
        repo.refs.update_head(&commit_oid)?;

        tracing::info!(commit = %commit_oid, "merge completed successfully");

        Ok(())
    }

    fn current_author() -> Author {
        let name = env::var("GIT_AUTHOR_NAME").unwrap_or_else(|_| {
            tracing::warn!("GIT_AUTHOR_NAME not set, using default");
            "Default Author".to_string()
        });
        let email = env::var("GIT_AUTHOR_EMAIL").unwrap_or_else(|_| {
            tracing::warn!("GIT_AUTHOR_EMAIL not set, using default");
            "author@example.com".to_string()
        });
        Author::new(name, email)
    }

    fn handle_fast_forward(
        database: &mut Database,
        workspace: &Workspace,
        index: &mut crate::core::index::index::Index,
        refs: &Refs,
        current_oid: &str,
        target_oid: &str,
    ) -> Result<(), Error> {
        let a_short = &current_oid[0..std::cmp::min(8, current_oid.len())];
        let b_short = &target_oid[0..std::cmp::min(8, target_oid.len())];
        tracing::info!(from = %a_short, to = %b_short, "fast-forward");

        let target_commit_obj = database.load(target_oid)?;
        let target_commit = match target_commit_obj.as_any().downcast_ref::<Commit>() {
            Some(c) => c,
            None => return Err(Error::Generic(format!("Target OID {} is not a commit", target_oid))),
        };
        let target_tree_oid = target_commit.get_tree();

        let current_commit_obj = database.load(current_oid)?;
        let current_commit = match current_commit_obj.as_any().downcast_ref::<Commit>() {
            Some(c) => c,
            None => return Err(Error::Generic(format!("Current HEAD OID {} is not a commit", current_oid))),
        };
        let current_tree_oid = current_commit.get_tree();

        let path_filter = PathFilter::new();
        let tree_diff = database.tree_diff(Some(current_tree_oid), Some(target_tree_oid), &path_filter)?;

        let mut diff_applied = false;

        if tree_diff.is_empty() {
            index.set_changed(false);
        } else {
            for (path, (old_entry, new_entry)) in &tree_diff {
                match (old_entry, new_entry) {
                    (Some(_old), Some(new)) => {
                        if new.get_file_mode().is_directory() {
                            workspace.make_directory(&path)?;
                            let tree_obj = database.load(new.get_oid())?;
                            if let Some(tree) = tree_obj.as_any().downcast_ref::<Tree>() {
                                Self::process_tree_entries(tree, path, database, workspace, index)?;
                            }
                        } else {
                            Self::update_workspace_file(database, workspace, index, path, new.get_oid(), &new.get_file_mode())?;
                        }
                    }
                    (None, Some(new)) => {
                        if new.get_file_mode().is_directory() {
                            workspace.make_directory(&path)?;
                            let tree_obj = database.load(new.get_oid())?;
                            if let Some(tree) = tree_obj.as_any().downcast_ref::<Tree>() {
                                Self::process_tree_entries(tree, path, database, workspace, index)?;
                            }
                        } else {
                            Self::update_workspace_file(database, workspace, index, path, new.get_oid(), &new.get_file_mode())?;
                        }
                    }
                    (Some(old), None) => {
                        let path_str = path.to_string_lossy().to_string();
                        if old.get_file_mode().is_directory() {
                            workspace.force_remove_directory(path)?;
                        } else {
                            workspace.remove_file(path)?;
                        }
                        index.remove(&path_str)?;
                    }
                    (None, None) => {}
                }
            }
            diff_applied = true;
            index.set_changed(true);
        }

        match index.write_updates() {
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "writing index updates failed");
                return Err(e);
            }
        }
        let _ = diff_applied;

        refs.update_head(target_oid)?;

        tracing::info!("fast-forward merge completed");
        Ok(())
    }

    fn process_tree_entries(
        tree: &Tree,
        parent_path: &Path,
        database: &mut Database,
        workspace: &Workspace,
        index: &mut crate::core::index::index::Index,
    ) -> Result<(), Error> {
        let mut target_entries = HashMap::new();
        for (name, entry) in tree.get_entries() {
            target_entries.insert(name.clone(), entry.clone());
        }

        let mut current_files = HashSet::new();
        let full_dir_path = workspace.root_path.join(parent_path);
        if full_dir_path.exists() && full_dir_path.is_dir() {
            if let Ok(entries) = std::fs::read_dir(&full_dir_path) {
                for entry_result in entries {
                    if let Ok(entry) = entry_result {
                        let file_name = entry.file_name().to_string_lossy().to_string();
                        if !file_name.starts_with('.') {
                            current_files.insert(file_name);
                        }
                    }
                }
            }
        }

        for (name, entry) in tree.get_entries() {
            let entry_path = parent_path.join(name);

            match entry {
                TreeEntry::Blob(oid, mode) => {
                    Self::update_workspace_file(database, workspace, index, &entry_path, oid, mode)?;
                    current_files.remove(name);
                }
                TreeEntry::Tree(subtree) => {
                    workspace.make_directory(&entry_path)?;

                    if let Some(subtree_oid) = subtree.get_oid() {
                        let subtree_obj = database.load(subtree_oid)?;
                        if let Some(subtree) = subtree_obj.as_any().downcast_ref::<Tree>() {
                            Self::process_tree_entries(subtree, &entry_path, database, workspace, index)?;
                        }
                    }
                    current_files.remove(name);
                }
            }
        }

        for old_name in current_files {
            let old_path = parent_path.join(&old_name);
            let path_str = old_path.to_string_lossy().to_string();

            let full_path = workspace.root_path.join(&old_path);
            if full_path.is_dir() {
                workspace.force_remove_directory(&old_path)?;
            } else {
                workspace.remove_file(&old_path)?;
            }

            index.remove(&path_str)?;
        }

        Ok(())
    }

    fn update_workspace_file(
        database: &mut Database,
        workspace: &Workspace,
        index: &mut crate::core::index::index::Index,
        path: &PathBuf,
        oid: &str,
        mode: &FileMode,
    ) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                let parent_full_path = workspace.root_path.join(parent);
                if !parent_full_path.exists() {
                    workspace.make_directory(parent)?;
                }
            }
        }
        let blob_obj = database.load(oid)?;
        let content = blob_obj.to_bytes();
        workspace.write_file(path, &content)?;
        let stat = workspace.stat_file(path)?;
        index.add(path, oid, &stat)?;
        Ok(())
    }
}

use std::path::{Path, PathBuf};

/// A document and the documents nested directly beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyNode {
    pub path: PathBuf,
    pub children: Vec<FamilyNode>,
}

/// Master document plus its descendants arranged by directory nesting.
///
/// A document's children are the descendants whose closest enclosing
/// document lives in its own directory, so a change walked down this tree
/// reaches every document exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub master: PathBuf,
    pub children: Vec<FamilyNode>,
}

impl Family {
    pub fn build(master: &Path, mut descendants: Vec<PathBuf>) -> Self {
        descendants.retain(|path| path != master);
        // Shallow paths first so every document's ancestors are placed before it
        descendants.sort_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        });
        descendants.dedup();

        let mut parents: Vec<Option<usize>> = Vec::with_capacity(descendants.len());
        for (i, path) in descendants.iter().enumerate() {
            let dir = path.parent().unwrap_or(Path::new(""));
            let parent = (0..i)
                .filter(|&j| {
                    let candidate_dir = descendants[j].parent().unwrap_or(Path::new(""));
                    dir != candidate_dir && dir.starts_with(candidate_dir)
                })
                .max_by_key(|&j| descendants[j].components().count());
            parents.push(parent);
        }

        let children = Self::collect(&descendants, &parents, None);
        Self {
            master: master.to_path_buf(),
            children,
        }
    }

    fn collect(
        paths: &[PathBuf],
        parents: &[Option<usize>],
        parent: Option<usize>,
    ) -> Vec<FamilyNode> {
        let mut nodes: Vec<FamilyNode> = parents
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == parent)
            .map(|(i, _)| FamilyNode {
                path: paths[i].clone(),
                children: Self::collect(paths, parents, Some(i)),
            })
            .collect();
        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        nodes
    }

    /// Number of descendant documents
    pub fn len(&self) -> usize {
        fn count(nodes: &[FamilyNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.children)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Descendants in the order propagation visits them: depth-first,
    /// each document before its own children.
    pub fn visit_order(&self) -> Vec<&Path> {
        fn walk<'a>(nodes: &'a [FamilyNode], out: &mut Vec<&'a Path>) {
            for node in nodes {
                out.push(&node.path);
                walk(&node.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn test_nested_documents_hang_under_nearest_ancestor() {
        let family = Family::build(
            Path::new("/r/resume.html"),
            vec![
                p("/r/b/resume.html"),
                p("/r/a/x/resume.html"),
                p("/r/a/resume.html"),
                p("/r/a/x/y/z/resume.html"),
                p("/r/c/deep/resume.html"),
            ],
        );

        assert_eq!(family.len(), 5);
        assert_eq!(family.children.len(), 3);

        let a = &family.children[0];
        assert_eq!(a.path, p("/r/a/resume.html"));
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].path, p("/r/a/x/resume.html"));
        assert_eq!(a.children[0].children[0].path, p("/r/a/x/y/z/resume.html"));

        assert_eq!(family.children[1].path, p("/r/b/resume.html"));
        // No document in /r/c, so the deep one belongs to the master directly
        assert_eq!(family.children[2].path, p("/r/c/deep/resume.html"));
    }

    #[test]
    fn test_visit_order_is_depth_first() {
        let family = Family::build(
            Path::new("/r/resume.html"),
            vec![
                p("/r/b/resume.html"),
                p("/r/a/x/resume.html"),
                p("/r/a/resume.html"),
            ],
        );

        assert_eq!(
            family.visit_order(),
            vec![
                Path::new("/r/a/resume.html"),
                Path::new("/r/a/x/resume.html"),
                Path::new("/r/b/resume.html"),
            ]
        );
    }

    #[test]
    fn test_similar_directory_prefix_is_not_ancestry() {
        let family = Family::build(
            Path::new("/r/resume.html"),
            vec![p("/r/a/resume.html"), p("/r/ab/resume.html")],
        );
        assert_eq!(family.children.len(), 2);
        assert!(family.children.iter().all(|c| c.children.is_empty()));
    }

    #[test]
    fn test_empty_family() {
        let family = Family::build(Path::new("/r/resume.html"), Vec::new());
        assert!(family.is_empty());
        assert_eq!(family.len(), 0);
    }
}

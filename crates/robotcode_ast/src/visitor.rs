use crate::nodes::{
    Arguments, File, Fixture, Keyword, KeywordCall, LibraryImport, Node, ResourceImport, Template,
    TestCase, TestTemplate,
};

/// A fallible preorder traversal over [`Node`]s.
///
/// Every `visit_*` method defaults to visiting the node's children, so an
/// implementation only overrides the variants it cares about. The associated
/// error type lets traversals abort early, which is how cancellation
/// propagates out of an analysis pass.
pub trait Visitor {
    type Error;

    fn visit_node(&mut self, node: &Node) -> Result<(), Self::Error> {
        walk_node(self, node)
    }

    /// Visit all children of `node` without dispatching on `node` itself.
    fn generic_visit(&mut self, node: &Node) -> Result<(), Self::Error> {
        for child in node.children() {
            self.visit_node(child)?;
        }
        Ok(())
    }

    fn visit_file(&mut self, node: &File) -> Result<(), Self::Error> {
        for child in &node.body {
            self.visit_node(child)?;
        }
        Ok(())
    }

    fn visit_test_case(&mut self, node: &TestCase) -> Result<(), Self::Error> {
        for child in &node.body {
            self.visit_node(child)?;
        }
        Ok(())
    }

    fn visit_keyword(&mut self, node: &Keyword) -> Result<(), Self::Error> {
        for child in &node.body {
            self.visit_node(child)?;
        }
        Ok(())
    }

    fn visit_keyword_call(&mut self, _node: &KeywordCall) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_fixture(&mut self, _node: &Fixture) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_template(&mut self, _node: &Template) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_test_template(&mut self, _node: &TestTemplate) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_library_import(&mut self, _node: &LibraryImport) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_resource_import(&mut self, _node: &ResourceImport) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_arguments(&mut self, _node: &Arguments) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Dispatch `node` to the matching `visit_*` method.
pub fn walk_node<V>(visitor: &mut V, node: &Node) -> Result<(), V::Error>
where
    V: Visitor + ?Sized,
{
    match node {
        Node::File(n) => visitor.visit_file(n),
        Node::TestCase(n) => visitor.visit_test_case(n),
        Node::Keyword(n) => visitor.visit_keyword(n),
        Node::KeywordCall(n) => visitor.visit_keyword_call(n),
        Node::Fixture(n) => visitor.visit_fixture(n),
        Node::Template(n) => visitor.visit_template(n),
        Node::TestTemplate(n) => visitor.visit_test_template(n),
        Node::LibraryImport(n) => visitor.visit_library_import(n),
        Node::ResourceImport(n) => visitor.visit_resource_import(n),
        Node::Arguments(n) => visitor.visit_arguments(n),
    }
}

/// Preorder iterator over `node` and all of its descendants.
///
/// Ancestors are yielded before descendants, so for a position contained in
/// several nested nodes the innermost one is the last match.
pub fn walk(node: &Node) -> Walk<'_> {
    Walk { stack: vec![node] }
}

pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

use state_tree::{Lifecycle, Scope, State, StateTree, StateTreeError, Transition, TreeBuilder};

#[derive(Default)]
struct Tally {
    budget: u32,
}

fn budget(tally: &mut Tally) -> &mut u32 {
    &mut tally.budget
}

struct Node(Option<Transition>, Option<u32>);

impl Lifecycle<Tally> for Node {
    fn enter(&mut self, scope: &mut Scope<'_, Tally>) {
        if let Some(value) = self.1 {
            scope.temporary_change(budget, value);
        }
    }
}

impl State<(), Tally> for Node {
    fn try_transition(&mut self, _: &(), _: &Tally) -> Option<Transition> {
        self.0
    }
}

#[test]
fn duplicate_sibling_names_are_rejected() {
    let mut builder = TreeBuilder::new("dup", "root", Node(None, None), Tally::default());
    let root = builder.root();
    builder.add_child(root, "twin", Node(None, None)).unwrap();
    assert_eq!(
        builder.add_child(root, "twin", Node(None, None)).err(),
        Some(StateTreeError::DuplicateChild {
            parent: "root",
            name: "twin"
        })
    );
}

#[test]
fn boxed_states_resolve_like_plain_ones() {
    let mut builder: TreeBuilder<Box<dyn State<(), Tally>>, Tally> = TreeBuilder::new(
        "boxed",
        "root",
        Box::new(Node(Some(Transition::Child("spend")), None)),
        Tally { budget: 1 },
    );
    let root = builder.root();
    builder
        .add_child(root, "spend", Box::new(Node(None, Some(4))))
        .unwrap();
    let mut tree: StateTree<_, _> = builder.build();

    let resolution = tree.resolve_stable_leaf(&());
    assert!(resolution.is_clean());
    assert_eq!(tree.name(resolution.leaf), "spend");
    assert_eq!(tree.blackboard().budget, 4);

    tree.shutdown();
    assert_eq!(tree.blackboard().budget, 1);
}

#[test]
fn default_cap_scales_with_tree_shape() {
    let mut builder = TreeBuilder::new("wide", "root", Node(None, None), Tally::default());
    let root = builder.root();
    for name in ["a", "b", "c", "d", "e"] {
        builder.add_child(root, name, Node(None, None)).unwrap();
    }
    // depth 1, breadth 5
    assert_eq!(builder.build().iteration_cap(), 20);
}

//! Property tests for action dispatch order and transformation composition.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use zentinel_secrule::actions::ActionGroup;
use zentinel_secrule::engine::execute_actions;
use zentinel_secrule::transformations::{create_transformation, TransformationPipeline};
use zentinel_secrule::{Action, Transaction};

struct Tagged {
    seq: usize,
    group: ActionGroup,
    log: Arc<Mutex<Vec<(ActionGroup, usize)>>>,
}

impl Action for Tagged {
    fn name(&self) -> &'static str {
        "tagged"
    }

    fn value(&self) -> &str {
        ""
    }

    fn group(&self) -> ActionGroup {
        self.group
    }

    fn execute(&self, tx: &mut Transaction) {
        // Disruptive-looking side effects must not stop the rest of the list.
        if self.group == ActionGroup::Disruptive {
            tx.abort();
        }
        self.log.lock().unwrap().push((self.group, self.seq));
    }
}

fn arb_group() -> impl Strategy<Value = ActionGroup> {
    prop_oneof![
        Just(ActionGroup::MetaData),
        Just(ActionGroup::Data),
        Just(ActionGroup::NonDisruptive),
        Just(ActionGroup::Disruptive),
        Just(ActionGroup::Flow),
    ]
}

const TRANSFORMATIONS: &[&str] = &[
    "lowercase",
    "uppercase",
    "trim",
    "compressWhitespace",
    "removeNulls",
    "urlDecode",
    "urlDecodeUni",
    "length",
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every action runs exactly once, grouped in the fixed order and
    /// stable within a group.
    #[test]
    fn dispatch_is_grouped_and_stable(groups in prop::collection::vec(arb_group(), 0..24)) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let actions: Vec<Arc<dyn Action>> = groups
            .iter()
            .enumerate()
            .map(|(seq, group)| {
                Arc::new(Tagged { seq, group: *group, log: Arc::clone(&log) }) as Arc<dyn Action>
            })
            .collect();

        let mut tx = Transaction::new();
        execute_actions(&mut tx, &actions);

        let ran = log.lock().unwrap().clone();
        prop_assert_eq!(ran.len(), groups.len());

        let mut expected: Vec<(ActionGroup, usize)> =
            groups.iter().copied().enumerate().map(|(seq, g)| (g, seq)).collect();
        expected.sort_by_key(|(g, seq)| (g.index(), *seq));
        prop_assert_eq!(ran, expected);
    }

    /// A pipeline equals folding its transformations one by one.
    #[test]
    fn pipeline_is_left_fold(
        names in prop::collection::vec(prop::sample::select(TRANSFORMATIONS), 0..6),
        input in "[ a-zA-Z0-9%+\\x00]{0,32}",
    ) {
        let tx = Transaction::new();
        let pipeline = TransformationPipeline::from_names(&names).unwrap();

        let mut folded = input.clone();
        for name in &names {
            let t = create_transformation(name).unwrap();
            folded = t.transform(&tx, &folded).into_owned();
        }

        prop_assert_eq!(pipeline.apply(&tx, &input).into_owned(), folded);
    }

    /// Normalizing transformations are idempotent.
    #[test]
    fn normalizing_transformations_idempotent(input in "[ -~\\t\\n]{0,32}") {
        let tx = Transaction::new();
        for name in ["lowercase", "uppercase", "trim", "compressWhitespace"] {
            let t = create_transformation(name).unwrap();
            let once = t.transform(&tx, &input).into_owned();
            let twice = t.transform(&tx, &once).into_owned();
            prop_assert_eq!(&once, &twice, "{} not idempotent", name);
        }
    }
}

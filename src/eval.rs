// src/eval.rs
// Attribute evaluation at reduce time.
//
// Every action of the reduced rule is bound to its target attribute, which
// must still be pending. A bound attribute is attempted at once; if one of
// its parameters is itself pending, the attribute parks on that parameter's
// declic list and is replayed when the parameter resolves. Copies never
// wait: they turn the target into an alias and hand its waiters over to the
// source.

use crate::{
    host::{Call, ErrorKind, Host, Source},
    messages::{self, Message},
    object::{Binding, Node, ObjectId},
    parser::Compilation,
    tables::Slot,
};

impl<S: Source, H: Host> Compilation<'_, S, H> {
    fn slot(&mut self, slot: Slot, lhs: &[ObjectId], rhs: &[&[ObjectId]]) -> ObjectId {
        let attrs = match slot.depth {
            0 => lhs,
            d => rhs.get(d as usize - 1).copied().unwrap_or(&[]),
        };
        match attrs.get(slot.attribute as usize) {
            Some(&id) => id,
            None => {
                log::warn!(
                    "attribute {} at depth {} does not exist",
                    slot.attribute,
                    slot.depth
                );
                self.graph.alloc(Node::Null)
            }
        }
    }

    /// Runs the semantic actions of `rule_id` in declared order, then every
    /// replay they triggered.
    pub(crate) fn run_rule(&mut self, rule_id: u32, lhs: &[ObjectId], rhs: &[&[ObjectId]]) {
        let compiler = self.compiler;
        let rule = &compiler.rules[rule_id as usize];
        for (i, action) in rule.actions.iter().enumerate() {
            self.stats.actions += 1;
            let target = self.slot(action.target, lhs, rhs);
            let params: Vec<ObjectId> = action
                .params
                .iter()
                .map(|&p| self.slot(p, lhs, rhs))
                .collect();

            match self.graph.node_mut(target) {
                Node::Pending(p) if p.binding.is_none() => {
                    p.binding = Some(Binding {
                        rule: rule_id,
                        action: i as u32,
                        params,
                    });
                }
                Node::Pending(_) => {
                    log::warn!("rule {rule_id} action {i}: attribute already has a definition");
                    continue;
                }
                // Recovery placeholders, or already aliased away.
                _ => {
                    log::trace!("rule {rule_id} action {i}: target already resolved, skipped");
                    continue;
                }
            }
            self.attempt(target);
        }
        self.drain_replays();
    }

    fn drain_replays(&mut self) {
        while let Some(id) = self.replay.pop_front() {
            self.stats.replays += 1;
            self.attempt(id);
        }
    }

    /// Tries to resolve the bound pending attribute `target`.
    fn attempt(&mut self, target: ObjectId) {
        let (rule, action_idx, params, origin) = match self.graph.node(target) {
            Node::Pending(p) => match &p.binding {
                Some(b) => (b.rule, b.action, b.params.clone(), p.origin),
                None => return,
            },
            _ => return,
        };
        let compiler = self.compiler;
        let action = &compiler.rules[rule as usize].actions[action_idx as usize];

        if action.is_copy() {
            let source = self.graph.representative(params[0]);
            if source == target {
                log::warn!("rule {rule} action {action_idx}: attribute copied onto itself");
                return;
            }
            let old = self.graph.replace(target, Node::Alias(source));
            let Node::Pending(old) = old else {
                unreachable!("attempted attribute was pending")
            };
            match self.graph.node_mut(source) {
                Node::Pending(p) => p.declic.extend(old.declic),
                _ => self.replay.extend(old.declic),
            }
            return;
        }

        for &p in &params {
            let rep = self.graph.representative(p);
            if let Node::Pending(pending) = self.graph.node_mut(rep) {
                if !pending.declic.contains(&target) {
                    pending.declic.push(target);
                }
                self.stats.deferred += 1;
                log::trace!("rule {rule} action {action_idx}: waiting on {rep:?}");
                return;
            }
        }

        let error_in = params.iter().any(|&p| self.graph.is_error(p));
        let node = if action.soft {
            Node::Term {
                function: action.function,
                children: params,
                pos: origin.pos,
                error: error_in,
            }
        } else if error_in || self.locked() {
            Node::Null
        } else {
            self.stats.hard_calls += 1;
            let call = Call::new(action.function, origin.pos, &params, &self.graph);
            match self.host.execution(call, &mut self.control) {
                Ok(produced) => Node::User {
                    value: Some(produced.value),
                    pos: produced.pos.unwrap_or(origin.pos),
                    function: action.function,
                    error: false,
                },
                Err(e) => {
                    let message = Message::new(messages::SEMANTIC_FAILED).arg(e.message);
                    self.report(ErrorKind::Semantic, origin, &message);
                    Node::User {
                        value: None,
                        pos: origin.pos,
                        function: action.function,
                        error: true,
                    }
                }
            }
        };

        if let Node::Pending(old) = self.graph.replace(target, node) {
            self.replay.extend(old.declic);
        }
    }
}

//! Animation primitives.
//!
//! An [`Action`] is a declarative description ("scale to 1.3 over 0.25s").
//! Running it on a node turns it into a [`RunningAction`] that captures its
//! start values the first time it is stepped, so an action built now and
//! started later still animates from wherever the node happens to be.
//!
//! Work that has to happen when an animation finishes is expressed as an
//! instant action at the end of a [`Action::Sequence`] rather than a callback.
//! Cancelling the sequence by key therefore cancels the follow-up as well.

use glam::Vec2;

use crate::assets::{SoundId, TextureId};
use crate::graph::{Content, Node, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    ScaleTo { to: Vec2, duration: f32 },
    /// Horizontal scale only; the y scale is left alone.
    ScaleXTo { to: f32, duration: f32 },
    MoveTo { to: Vec2, duration: f32 },
    Sequence(Vec<Action>),
    Group(Vec<Action>),
    RepeatForever(Box<Action>),
    SetTexture(TextureId),
    SetZ(f32),
    SetHidden(bool),
    PlaySound(SoundId),
    /// Start `action` on another node under `key`. Completes instantly.
    RunOn {
        node: NodeId,
        key: String,
        action: Box<Action>,
    },
}

impl Action {
    pub fn scale_to(scale: f32, duration: f32) -> Self {
        Action::ScaleTo {
            to: Vec2::splat(scale),
            duration,
        }
    }

    pub fn scale_x_to(scale: f32, duration: f32) -> Self {
        Action::ScaleXTo { to: scale, duration }
    }

    pub fn move_to(to: Vec2, duration: f32) -> Self {
        Action::MoveTo { to, duration }
    }

    pub fn sequence(actions: impl IntoIterator<Item = Action>) -> Self {
        Action::Sequence(actions.into_iter().collect())
    }

    pub fn group(actions: impl IntoIterator<Item = Action>) -> Self {
        Action::Group(actions.into_iter().collect())
    }

    pub fn repeat_forever(action: Action) -> Self {
        Action::RepeatForever(Box::new(action))
    }

    pub fn run_on(node: NodeId, key: &str, action: Action) -> Self {
        Action::RunOn {
            node,
            key: key.to_owned(),
            action: Box::new(action),
        }
    }

}

/// Side effects a running action cannot apply to its own node.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Effect {
    Sound(SoundId),
    /// Start an action on `node` under `key`.
    Run { node: NodeId, key: String, action: Action },
}

#[derive(Debug)]
pub(crate) enum Step {
    Running,
    /// Finished, with the part of `dt` it did not use.
    Done(f32),
}

#[derive(Debug, Clone, Copy)]
struct Clock {
    elapsed: f32,
    duration: f32,
}

impl Clock {
    fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Returns normalized progress and, once finished, the unused time.
    fn advance(&mut self, dt: f32) -> (f32, Option<f32>) {
        if self.duration <= 0.0 {
            return (1.0, Some(dt));
        }
        let before = self.elapsed;
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            let leftover = dt - (self.duration - before);
            self.elapsed = self.duration;
            (1.0, Some(leftover.max(0.0)))
        } else {
            (self.elapsed / self.duration, None)
        }
    }
}

#[derive(Debug)]
enum State {
    Scale {
        from: Option<Vec2>,
        to: Vec2,
        clock: Clock,
    },
    ScaleX {
        from: Option<f32>,
        to: f32,
        clock: Clock,
    },
    Move {
        from: Option<Vec2>,
        to: Vec2,
        clock: Clock,
    },
    Instant(Action),
    Sequence {
        steps: Vec<Action>,
        index: usize,
        current: Option<Box<State>>,
    },
    Group {
        members: Vec<(State, bool)>,
    },
    Repeat {
        body: Action,
        current: Box<State>,
    },
}

impl State {
    fn start(action: &Action) -> Self {
        match action {
            Action::ScaleTo { to, duration } => State::Scale {
                from: None,
                to: *to,
                clock: Clock::new(*duration),
            },
            Action::ScaleXTo { to, duration } => State::ScaleX {
                from: None,
                to: *to,
                clock: Clock::new(*duration),
            },
            Action::MoveTo { to, duration } => State::Move {
                from: None,
                to: *to,
                clock: Clock::new(*duration),
            },
            Action::Sequence(steps) => State::Sequence {
                steps: steps.clone(),
                index: 0,
                current: None,
            },
            Action::Group(members) => State::Group {
                members: members.iter().map(|a| (State::start(a), false)).collect(),
            },
            Action::RepeatForever(body) => State::Repeat {
                body: (**body).clone(),
                current: Box::new(State::start(body)),
            },
            instant => State::Instant(instant.clone()),
        }
    }

    fn step(&mut self, dt: f32, node: &mut Node, effects: &mut Vec<Effect>) -> Step {
        match self {
            State::Scale { from, to, clock } => {
                let from = *from.get_or_insert(node.scale);
                let (t, done) = clock.advance(dt);
                node.scale = from.lerp(*to, t);
                done.map_or(Step::Running, Step::Done)
            }
            State::ScaleX { from, to, clock } => {
                let from = *from.get_or_insert(node.scale.x);
                let (t, done) = clock.advance(dt);
                node.scale.x = from + (*to - from) * t;
                done.map_or(Step::Running, Step::Done)
            }
            State::Move { from, to, clock } => {
                let from = *from.get_or_insert(node.position);
                let (t, done) = clock.advance(dt);
                node.position = from.lerp(*to, t);
                done.map_or(Step::Running, Step::Done)
            }
            State::Instant(action) => {
                match action {
                    Action::SetTexture(texture) => node.content = Content::Sprite(*texture),
                    Action::SetZ(z) => node.z = *z,
                    Action::SetHidden(hidden) => node.hidden = *hidden,
                    Action::PlaySound(sound) => effects.push(Effect::Sound(*sound)),
                    Action::RunOn {
                        node: target,
                        key,
                        action,
                    } => effects.push(Effect::Run {
                        node: *target,
                        key: key.clone(),
                        action: (**action).clone(),
                    }),
                    _ => {}
                }
                Step::Done(dt)
            }
            State::Sequence {
                steps,
                index,
                current,
            } => {
                let mut remaining = dt;
                while *index < steps.len() {
                    let state = current.get_or_insert_with(|| Box::new(State::start(&steps[*index])));
                    match state.step(remaining, node, effects) {
                        Step::Running => return Step::Running,
                        Step::Done(left) => {
                            *index += 1;
                            *current = None;
                            remaining = left;
                        }
                    }
                }
                Step::Done(remaining)
            }
            State::Group { members } => {
                // members done in an earlier tick use none of this one
                let mut least = dt;
                let mut running = false;
                for (state, finished) in members.iter_mut() {
                    if *finished {
                        continue;
                    }
                    match state.step(dt, node, effects) {
                        Step::Running => running = true,
                        Step::Done(left) => {
                            *finished = true;
                            least = least.min(left);
                        }
                    }
                }
                if running {
                    Step::Running
                } else {
                    Step::Done(least)
                }
            }
            State::Repeat { body, current } => {
                let mut remaining = dt;
                loop {
                    match current.step(remaining, node, effects) {
                        Step::Running => return Step::Running,
                        Step::Done(left) => {
                            **current = State::start(body);
                            // a body that takes no time runs once per tick
                            if remaining - left <= 0.0 {
                                return Step::Running;
                            }
                            remaining = left;
                        }
                    }
                }
            }
        }
    }
}

/// An action attached to a node, optionally under a key.
#[derive(Debug)]
pub struct RunningAction {
    key: Option<String>,
    state: State,
}

impl RunningAction {
    pub(crate) fn new(action: &Action, key: Option<String>) -> Self {
        Self {
            key,
            state: State::start(action),
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub(crate) fn step(&mut self, dt: f32, node: &mut Node, effects: &mut Vec<Effect>) -> Step {
        self.state.step(dt, node, effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(action: &Action, node: &mut Node, ticks: &[f32]) -> (bool, Vec<Effect>) {
        let mut running = RunningAction::new(action, None);
        let mut effects = Vec::new();
        let mut done = false;
        for dt in ticks {
            done = matches!(running.step(*dt, node, &mut effects), Step::Done(_));
        }
        (done, effects)
    }

    #[test]
    fn scale_interpolates_from_the_value_at_first_step() {
        let mut node = Node::empty("n", Vec2::ONE);
        node.scale = Vec2::splat(2.0);
        let (done, _) = run(&Action::scale_to(1.0, 1.0), &mut node, &[0.5]);
        assert!(!done);
        assert!((node.scale.x - 1.5).abs() < 1e-5);
        assert!((node.scale.y - 1.5).abs() < 1e-5);
    }

    #[test]
    fn scale_x_leaves_y_alone() {
        let mut node = Node::empty("n", Vec2::ONE);
        let (done, _) = run(&Action::scale_x_to(0.0, 0.15), &mut node, &[0.2]);
        assert!(done);
        assert_eq!(node.scale, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn sequence_carries_leftover_time_into_the_next_step() {
        let mut node = Node::empty("n", Vec2::ONE);
        let action = Action::sequence([
            Action::move_to(Vec2::new(10.0, 0.0), 0.1),
            Action::move_to(Vec2::new(10.0, 10.0), 0.2),
        ]);
        run(&action, &mut node, &[0.2]);
        assert!((node.position.x - 10.0).abs() < 1e-5);
        assert!((node.position.y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn follow_up_runs_only_after_the_animation() {
        let mut node = Node::empty("n", Vec2::ONE);
        node.z = 200.0;
        let action = Action::sequence([Action::scale_to(1.0, 0.3), Action::SetZ(10.0)]);
        let mut running = RunningAction::new(&action, None);
        let mut effects = Vec::new();
        running.step(0.2, &mut node, &mut effects);
        assert_eq!(node.z, 200.0);
        running.step(0.2, &mut node, &mut effects);
        assert_eq!(node.z, 10.0);
    }

    #[test]
    fn group_finishes_with_its_longest_member() {
        let mut node = Node::empty("n", Vec2::ONE);
        let action = Action::group([
            Action::move_to(Vec2::new(5.0, 0.0), 0.1),
            Action::scale_to(2.0, 0.3),
        ]);
        let mut running = RunningAction::new(&action, None);
        let mut effects = Vec::new();
        assert!(matches!(running.step(0.2, &mut node, &mut effects), Step::Running));
        match running.step(0.2, &mut node, &mut effects) {
            Step::Done(left) => assert!((left - 0.1).abs() < 1e-5),
            Step::Running => panic!("group should have finished"),
        }
    }

    #[test]
    fn repeat_forever_never_finishes() {
        let mut node = Node::empty("n", Vec2::ONE);
        let wiggle = Action::repeat_forever(Action::sequence([
            Action::scale_x_to(1.0, 0.2),
            Action::scale_x_to(1.2, 0.2),
        ]));
        let (done, _) = run(&wiggle, &mut node, &[0.4, 0.4, 0.4, 0.3]);
        assert!(!done);
        assert!(node.scale.x > 1.0 && node.scale.x < 1.2);
    }

    #[test]
    fn repeat_of_instant_body_does_not_spin() {
        let mut node = Node::empty("n", Vec2::ONE);
        let action = Action::repeat_forever(Action::PlaySound(SoundId::from_raw(3)));
        let (done, effects) = run(&action, &mut node, &[1.0, 1.0]);
        assert!(!done);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut node = Node::empty("n", Vec2::ONE);
        let (done, _) = run(&Action::move_to(Vec2::new(3.0, 4.0), 0.0), &mut node, &[0.0]);
        assert!(done);
        assert_eq!(node.position, Vec2::new(3.0, 4.0));
    }
}

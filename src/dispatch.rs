//! Stack event fan-out.
//!
//! Every classified stack event goes to each consumer in
//! [`DISPATCH_ORDER`]. The order matters: connection-parameter negotiation
//! sees a new link first, the coordinator answers stack requests before the
//! protocol engine and the advertising subsystem observe their effects.

use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::events::StackEvent;
use crate::traits::{IndicatorSink, ProtocolEngine, StackObserver, StackReplies};

/// Stack event consumers, named in dispatch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Consumer {
    ConnParams,
    Coordinator,
    ProtocolEngine,
    Advertising,
}

pub const DISPATCH_ORDER: [Consumer; 4] = [
    Consumer::ConnParams,
    Consumer::Coordinator,
    Consumer::ProtocolEngine,
    Consumer::Advertising,
];

/// Everything a dispatch touches, borrowed for the duration of one call.
pub struct Targets<'a, CP, R, E, AD, S> {
    pub conn_params: &'a mut CP,
    pub coordinator: &'a mut Coordinator,
    pub replies: &'a mut R,
    pub engine: &'a mut E,
    pub advertising: &'a mut AD,
    pub indicators: &'a mut S,
}

/// Deliver `event` to every consumer in [`DISPATCH_ORDER`].
///
/// The first consumer error aborts the dispatch; it is fatal for the caller.
pub fn dispatch<CP, R, E, AD, S>(
    event: &StackEvent,
    targets: &mut Targets<'_, CP, R, E, AD, S>,
) -> Result<()>
where
    CP: StackObserver,
    R: StackReplies,
    E: ProtocolEngine,
    AD: StackObserver,
    S: IndicatorSink,
{
    trace!("dispatch {}", event);
    for consumer in DISPATCH_ORDER {
        match consumer {
            Consumer::ConnParams => targets.conn_params.on_stack_event(event)?,
            Consumer::Coordinator => {
                targets
                    .coordinator
                    .on_stack_event(event, targets.replies, targets.indicators)?
            }
            Consumer::ProtocolEngine => {
                if let Some(note) = targets.engine.on_stack_event(event)? {
                    targets.coordinator.on_notification(&note, targets.indicators);
                }
            }
            Consumer::Advertising => targets.advertising.on_stack_event(event)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoordinatorConfig;
    use crate::error::{Error, StackError};
    use crate::events::{ConnHandle, ProtocolNotification};
    use crate::mock::{Engine, Observer, Recorder, Replies, Reply};
    use crate::mode::BeaconMode;
    use std::cell::RefCell;
    use std::rc::Rc;

    const CONN: ConnHandle = ConnHandle(4);

    type Trace = Rc<RefCell<Vec<Consumer>>>;

    struct Tracing<T> {
        who: Consumer,
        trace: Trace,
        inner: T,
    }

    impl<T: StackObserver> StackObserver for Tracing<T> {
        fn on_stack_event(&mut self, event: &StackEvent) -> Result<()> {
            self.trace.borrow_mut().push(self.who);
            self.inner.on_stack_event(event)
        }
    }

    impl<T: StackReplies> StackReplies for Tracing<T> {
        fn reject_pairing(&mut self, conn: ConnHandle) -> Result<()> {
            self.trace.borrow_mut().push(self.who);
            self.inner.reject_pairing(conn)
        }

        fn set_empty_system_attributes(&mut self, conn: ConnHandle) -> Result<()> {
            self.trace.borrow_mut().push(self.who);
            self.inner.set_empty_system_attributes(conn)
        }

        fn reply_mtu(&mut self, conn: ConnHandle, server_mtu: u16) -> Result<()> {
            self.trace.borrow_mut().push(self.who);
            self.inner.reply_mtu(conn, server_mtu)
        }
    }

    impl<T: ProtocolEngine> ProtocolEngine for Tracing<T> {
        fn start_connectable_advertising(&mut self) -> Result<Option<ProtocolNotification>> {
            self.inner.start_connectable_advertising()
        }

        fn on_stack_event(&mut self, event: &StackEvent) -> Result<Option<ProtocolNotification>> {
            self.trace.borrow_mut().push(self.who);
            self.inner.on_stack_event(event)
        }
    }

    fn tracing<T>(who: Consumer, trace: &Trace, inner: T) -> Tracing<T> {
        Tracing {
            who,
            trace: trace.clone(),
            inner,
        }
    }

    #[test]
    fn consumers_run_in_documented_order() {
        let trace: Trace = Rc::default();
        let mut conn_params = tracing(Consumer::ConnParams, &trace, Observer::default());
        let mut coordinator = Coordinator::new(CoordinatorConfig::default());
        // The coordinator shows up in the trace through the reply it issues.
        let mut replies = tracing(Consumer::Coordinator, &trace, Replies::default());
        let mut engine = tracing(Consumer::ProtocolEngine, &trace, Engine::default());
        let mut advertising = tracing(Consumer::Advertising, &trace, Observer::default());
        let mut indicators = Recorder::default();

        let mut targets = Targets {
            conn_params: &mut conn_params,
            coordinator: &mut coordinator,
            replies: &mut replies,
            engine: &mut engine,
            advertising: &mut advertising,
            indicators: &mut indicators,
        };
        dispatch(&StackEvent::SecurityParamsRequested { conn: CONN }, &mut targets).unwrap();

        assert_eq!(*trace.borrow(), DISPATCH_ORDER);
        assert_eq!(replies.inner.sent, [Reply::PairingRejected(CONN)]);
    }

    #[test]
    fn every_consumer_sees_every_event() {
        let mut conn_params = Observer::default();
        let mut coordinator = Coordinator::new(CoordinatorConfig::default());
        let mut replies = Replies::default();
        let mut engine = Engine::default();
        let mut advertising = Observer::default();
        let mut indicators = Recorder::default();

        let events = [
            StackEvent::ConnectionEstablished { conn: CONN },
            StackEvent::MtuExchangeRequested {
                conn: CONN,
                client_mtu: 247,
            },
            StackEvent::ConnectionLost { conn: CONN },
        ];
        for event in &events {
            let mut targets = Targets {
                conn_params: &mut conn_params,
                coordinator: &mut coordinator,
                replies: &mut replies,
                engine: &mut engine,
                advertising: &mut advertising,
                indicators: &mut indicators,
            };
            dispatch(event, &mut targets).unwrap();
        }

        assert_eq!(conn_params.seen, events);
        assert_eq!(engine.seen, events);
        assert_eq!(advertising.seen, events);
        assert_eq!(replies.sent, [Reply::Mtu(CONN, 23)]);
    }

    #[test]
    fn engine_notification_reaches_coordinator_in_dispatch() {
        let mut conn_params = Observer::default();
        let mut coordinator = Coordinator::new(CoordinatorConfig {
            start_mode: BeaconMode::Connected,
            ..Default::default()
        });
        let mut replies = Replies::default();
        // Engine restarts connectable advertising when the link drops.
        let mut engine = Engine {
            on_event: Some(ProtocolNotification::ConnectableModeEntered),
            ..Default::default()
        };
        let mut advertising = Observer::default();
        let mut indicators = Recorder::default();

        let mut targets = Targets {
            conn_params: &mut conn_params,
            coordinator: &mut coordinator,
            replies: &mut replies,
            engine: &mut engine,
            advertising: &mut advertising,
            indicators: &mut indicators,
        };
        dispatch(&StackEvent::ConnectionLost { conn: CONN }, &mut targets).unwrap();

        assert_eq!(coordinator.mode(), BeaconMode::ConnectableAdvertising);
    }

    #[test]
    fn reply_failure_stops_dispatch() {
        let mut conn_params = Observer::default();
        let mut coordinator = Coordinator::new(CoordinatorConfig::default());
        let mut replies = Replies {
            fail_with: Some(StackError::SysAttrSet(0x3002)),
            ..Default::default()
        };
        let mut engine = Engine::default();
        let mut advertising = Observer::default();
        let mut indicators = Recorder::default();

        let mut targets = Targets {
            conn_params: &mut conn_params,
            coordinator: &mut coordinator,
            replies: &mut replies,
            engine: &mut engine,
            advertising: &mut advertising,
            indicators: &mut indicators,
        };
        let result = dispatch(&StackEvent::SystemAttributesMissing { conn: CONN }, &mut targets);

        assert_eq!(
            result,
            Err(Error::Stack(StackError::SysAttrSet(0x3002)))
        );
        assert_eq!(conn_params.seen.len(), 1);
        assert!(engine.seen.is_empty());
        assert!(advertising.seen.is_empty());
    }
}

//! Egg Maker: a worked tour of lazy wiring and hooks.
//!
//! A small kitchen graph with two services: `take_eggs` empties the pantry
//! and `make_eggs` turns what it got into a dish. Each scene builds the
//! same graph with a different hook set: none, a graceful fallback,
//! loggers, and a chained fail-fast + loggers combination.
//!
//! Run with `RUST_LOG=info cargo run --example egg_maker`; use `trace` to
//! watch the resolver itself.

use std::cell::Cell;
use std::rc::Rc;

use lazywire::{
    builders, chain, hooks, inject, BoxError, Factory, HookMap, Instance, ResolveError,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// One graph value type covering both kitchen services.
#[derive(Clone)]
enum Service {
    /// Empties the pantry and reports how many eggs were taken.
    TakeEggs(Rc<dyn Fn() -> Result<u32, BoxError>>),
    /// Prepares eggs in the requested style.
    MakeEggs(Rc<dyn Fn(&str) -> Result<String, BoxError>>),
}

impl Service {
    fn take(&self) -> Result<u32, BoxError> {
        match self {
            Service::TakeEggs(f) => f(),
            Service::MakeEggs(_) => Err("expected the `take_eggs` service".into()),
        }
    }

    fn make(&self, style: &str) -> Result<String, BoxError> {
        match self {
            Service::MakeEggs(f) => f(style),
            Service::TakeEggs(_) => Err("expected the `make_eggs` service".into()),
        }
    }
}

/// Wire the kitchen around an explicitly shared pantry.
fn egg_maker(pantry: Rc<Cell<u32>>) -> Factory<Service> {
    inject(builders! {
        take_eggs: move |_: &Instance<Service>| {
            let pantry = Rc::clone(&pantry);
            Ok(Service::TakeEggs(Rc::new(move || Ok(pantry.replace(0)))))
        },
        make_eggs: |it: &Instance<Service>| {
            let take = it.require("take_eggs")?;
            Ok(Service::MakeEggs(Rc::new(move |style| {
                let eggs = take.take()?;
                if eggs == 0 {
                    return Err("something went wrong".into());
                }
                Ok(format!("Made {eggs} {style} eggs."))
            })))
        },
    })
}

/// Build a hook that reports every call of the wrapped service.
fn logged(
    name: &'static str,
) -> impl Fn(Service, &Instance<Service>) -> Result<Service, ResolveError> {
    move |service, _| {
        Ok(match service {
            Service::TakeEggs(f) => Service::TakeEggs(Rc::new(move || {
                info!("started {name}");
                match f() {
                    Ok(count) => {
                        info!("result of {name}: {count}");
                        Ok(count)
                    }
                    Err(why) => {
                        error!("failed {name}: {why}");
                        Err(why)
                    }
                }
            })),
            Service::MakeEggs(f) => Service::MakeEggs(Rc::new(move |style| {
                info!("started {name}");
                match f(style) {
                    Ok(dish) => {
                        info!("result of {name}: {dish}");
                        Ok(dish)
                    }
                    Err(why) => {
                        error!("failed {name}: {why}");
                        Err(why)
                    }
                }
            })),
        })
    }
}

fn loggers() -> HookMap<Service> {
    hooks! {
        take_eggs: logged("taking eggs"),
        make_eggs: logged("making eggs"),
    }
}

fn main() -> Result<(), ResolveError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let pantry = Rc::new(Cell::new(3));
    let make = egg_maker(Rc::clone(&pantry));

    info!("scene 1: a fresh pantry");
    let plain = make.build();
    match plain.require("make_eggs")?.make("fried") {
        Ok(dish) => info!("{dish}"),
        Err(why) => error!("{why}"),
    }

    info!("scene 2: the pantry is empty now");
    match plain.require("make_eggs")?.make("scrambled") {
        Ok(dish) => info!("{dish}"),
        Err(why) => error!("{why}"),
    }

    info!("scene 3: a graceful kitchen");
    let graceful = make.build_with(hooks! {
        make_eggs: |service: Service, _: &Instance<Service>| {
            Ok(Service::MakeEggs(Rc::new(move |style| {
                Ok(service
                    .make(style)
                    .unwrap_or_else(|_| "No eggs could be made.".to_owned()))
            })))
        },
    });
    match graceful.require("make_eggs")?.make("scrambled") {
        Ok(dish) => info!("{dish}"),
        Err(why) => error!("{why}"),
    }

    info!("scene 4: every service call is logged");
    let observed = make.build_with(loggers());
    let _ = observed.require("make_eggs")?.make("scrambled");

    info!("scene 5: fail fast on an empty pantry, loggers watching");
    // The loggers come after the fail-fast hook so they observe its error.
    let strict = make.build_with(chain([
        hooks! {
            take_eggs: |service: Service, _: &Instance<Service>| {
                Ok(Service::TakeEggs(Rc::new(move || {
                    let count = service.take()?;
                    if count == 0 {
                        return Err("you got no eggs".into());
                    }
                    Ok(count)
                })))
            },
        },
        loggers(),
    ]));
    let _ = strict.require("make_eggs")?.make("scrambled");

    info!("scene 6: restock and try again");
    pantry.set(11);
    let _ = strict.require("make_eggs")?.make("scrambled");

    Ok(())
}

mod balancing;
mod calls;
mod failover;
mod timeouts;

mod audit;
mod handshake;
mod routes;
